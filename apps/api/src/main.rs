mod config;
mod db;
mod errors;
mod evaluation;
mod interview;
mod llm_client;
mod models;
mod retrieval;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::{EvaluationPipeline, EvaluationPool, Evaluator, SessionAggregator};
use crate::interview::profile::LlmProfileExtractor;
use crate::llm_client::{EmbeddingGateway, GenerationGateway, Generator, LlmClient};
use crate::retrieval::embedder::Embedder;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{EvaluationStore, KnowledgeStore, MemoryStore, PgStore, SummaryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence: PostgreSQL when configured, otherwise process memory
    let (knowledge, evaluations, summaries): (
        Arc<dyn KnowledgeStore>,
        Arc<dyn EvaluationStore>,
        Arc<dyn SummaryStore>,
    ) = match &config.database_url {
        Some(url) => {
            let store = Arc::new(PgStore::new(create_pool(url).await?));
            (store.clone(), store.clone(), store)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store.clone(), store)
        }
    };

    // Generation / embedding backend (optional)
    let (chat, eval, embedder) = match &config.llm_api_key {
        Some(key) => {
            let client = LlmClient::new(
                &config.llm_base_url,
                key.clone(),
                config.chat_model.clone(),
                config.embedding_model.clone(),
            )?;
            let eval_client = client.with_model(&config.eval_model);
            info!(
                "LLM client initialized (chat: {}, eval: {}, embeddings: {})",
                client.model(),
                eval_client.model(),
                config.embedding_model
            );
            let chat_gateway: Arc<dyn GenerationGateway> = Arc::new(client.clone());
            let eval_gateway: Arc<dyn GenerationGateway> = Arc::new(eval_client);
            let embedding_gateway: Arc<dyn EmbeddingGateway> = Arc::new(client);
            (
                Generator::new(Some(chat_gateway), config.generation_timeout),
                // rubric scoring gets twice the conversational ceiling
                Generator::new(Some(eval_gateway), config.generation_timeout * 2),
                Embedder::new(Some(embedding_gateway), config.generation_timeout),
            )
        }
        None => {
            warn!("No LLM backend configured; running on fallback content");
            (Generator::disabled(), Generator::disabled(), Embedder::offline())
        }
    };

    let pipeline = Arc::new(EvaluationPipeline::new(
        Evaluator::new(eval),
        evaluations.clone(),
        knowledge.clone(),
    ));
    let eval_pool = EvaluationPool::new(pipeline.clone(), config.eval_workers);
    info!("Evaluation pool initialized ({} workers)", config.eval_workers);

    // Build app state
    let state = AppState {
        config: config.clone(),
        profile_extractor: Arc::new(LlmProfileExtractor::new(chat.clone())),
        chat,
        embedder,
        knowledge,
        pipeline,
        eval_pool: eval_pool.clone(),
        aggregator: SessionAggregator::new(evaluations, summaries),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eval_pool.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
