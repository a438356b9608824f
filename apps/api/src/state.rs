use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::{EvaluationPipeline, EvaluationPool, SessionAggregator};
use crate::interview::profile::ProfileExtractor;
use crate::llm_client::Generator;
use crate::retrieval::embedder::Embedder;
use crate::store::KnowledgeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Conversation model behind a timeout. Disabled in fallback mode.
    pub chat: Generator,
    pub embedder: Embedder,
    pub knowledge: Arc<dyn KnowledgeStore>,
    /// Pluggable résumé parser. Default: LlmProfileExtractor.
    pub profile_extractor: Arc<dyn ProfileExtractor>,
    /// Synchronous scoring path used by POST /api/v1/evaluate.
    pub pipeline: Arc<EvaluationPipeline>,
    /// Background scoring for live sessions; drained on shutdown.
    pub eval_pool: EvaluationPool,
    pub aggregator: SessionAggregator,
}
