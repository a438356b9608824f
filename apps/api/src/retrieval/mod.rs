//! Retrieval-augmented grounding: knowledge-base seeding, résumé ingestion,
//! and the top-k context block fed into question prompts.

pub mod chunking;
pub mod embedder;
pub mod handlers;
pub mod prompts;
pub mod vector;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::llm_client::{Generator, PromptSpec};
use crate::retrieval::chunking::{chunk_text, join_snippets, CV_CHUNK_OVERLAP, CV_CHUNK_SIZE};
use crate::retrieval::embedder::Embedder;
use crate::retrieval::prompts::{grounded_question_system, grounded_question_user};
use crate::retrieval::vector::{rank, RetrievedItem};
use crate::store::KnowledgeStore;

/// Max rows loaded per source before ranking.
pub const MAX_CANDIDATE_ITEMS: usize = 200;
/// Items kept per source after ranking.
pub const TOP_K_PER_SOURCE: usize = 3;
/// Snippets allowed into one context block.
pub const MAX_CONTEXT_SNIPPETS: usize = 6;

/// Embeds and stores domain articles. Returns the number stored.
pub async fn seed_knowledge_base(
    store: &dyn KnowledgeStore,
    embedder: &Embedder,
    domain: &str,
    items: &[String],
) -> Result<usize> {
    let vectors = embedder.embed(items).await;
    let articles = items
        .iter()
        .zip(vectors)
        .map(|(text, embedding)| RetrievedItem::new(text.clone(), embedding))
        .collect();
    let inserted = store.add_kb_articles(domain, articles).await?;
    info!("Seeded {} knowledge-base articles for domain '{}'", inserted, domain);
    Ok(inserted)
}

/// Chunks, embeds and stores a résumé. Returns `(cv_id, chunk_count)`.
pub async fn ingest_cv(
    store: &dyn KnowledgeStore,
    embedder: &Embedder,
    user_id: Uuid,
    text: &str,
) -> Result<(Uuid, usize)> {
    let chunks = chunk_text(text, CV_CHUNK_SIZE, CV_CHUNK_OVERLAP);
    let vectors = embedder.embed(&chunks).await;
    let items: Vec<RetrievedItem> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, embedding)| RetrievedItem::new(chunk, embedding))
        .collect();
    let count = items.len();
    let cv_id = store.add_cv(user_id, text, items).await?;
    Ok((cv_id, count))
}

/// Candidate items for one interview: the user's résumé chunks and the
/// domain's knowledge-base articles, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct GroundingSources {
    pub cv_items: Vec<RetrievedItem>,
    pub kb_items: Vec<RetrievedItem>,
}

impl GroundingSources {
    pub async fn load(
        store: &dyn KnowledgeStore,
        user_id: Option<Uuid>,
        domain: Option<&str>,
    ) -> Result<Self> {
        let cv_items = match user_id {
            Some(user_id) => store.cv_chunks(user_id, MAX_CANDIDATE_ITEMS).await?,
            None => Vec::new(),
        };
        let kb_items = match domain.filter(|d| !d.trim().is_empty()) {
            Some(domain) => store.kb_articles(domain, MAX_CANDIDATE_ITEMS).await?,
            None => Vec::new(),
        };
        Ok(Self { cv_items, kb_items })
    }

    pub fn is_empty(&self) -> bool {
        self.cv_items.is_empty() && self.kb_items.is_empty()
    }

    /// Top résumé chunks followed by top articles for `query`, joined into one block.
    /// Empty string when there is nothing to rank.
    pub async fn context_block(&self, embedder: &Embedder, query: &str) -> String {
        if self.is_empty() {
            return String::new();
        }
        let query_vector = embedder.embed_one(query).await;
        let snippets: Vec<String> = rank(&self.cv_items, &query_vector, TOP_K_PER_SOURCE)
            .into_iter()
            .chain(rank(&self.kb_items, &query_vector, TOP_K_PER_SOURCE))
            .map(|item| item.text)
            .collect();
        join_snippets(&snippets, MAX_CONTEXT_SNIPPETS)
    }
}

/// One stand-alone interview question grounded in the user's résumé and the
/// domain knowledge base.
pub async fn grounded_question(
    generator: &Generator,
    embedder: &Embedder,
    sources: &GroundingSources,
    domain: &str,
    difficulty: &str,
) -> String {
    let fallback = format!("Tell me about your experience with {domain}.");
    let context = sources
        .context_block(embedder, &format!("next interview question for {domain}"))
        .await;

    let prompt = PromptSpec::new(
        "grounded_question",
        grounded_question_system(domain),
        grounded_question_user(&context, difficulty),
    )
    .temperature(0.3)
    .timeout_secs(60);

    generator.generate(&prompt).await.unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::vector::text_hash;
    use crate::store::MemoryStore;
    use crate::test_support::ScriptedGateway;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ingest_cv_stores_chunks() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let text = "x".repeat(9000);
        let (_, chunks) = ingest_cv(&store, &Embedder::offline(), user, &text).await.unwrap();
        // windows start at 0, 3600, 7200
        assert_eq!(chunks, 3);
        assert_eq!(store.cv_chunks(user, 200).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_context_block_prefers_similar_items() {
        let sources = GroundingSources {
            cv_items: vec![
                RetrievedItem::new("built a payments api", text_hash("built a payments api")),
                RetrievedItem::new("painted murals", text_hash("painted murals")),
            ],
            kb_items: vec![RetrievedItem::new("rest api design", text_hash("rest api design"))],
        };
        let block = sources
            .context_block(&Embedder::offline(), "built a payments api")
            .await;
        assert!(block.starts_with("built a payments api"));
        assert!(block.contains("rest api design"));
        assert_eq!(block.matches("\n---\n").count(), 2);
    }

    #[tokio::test]
    async fn test_context_block_empty_without_sources() {
        let block = GroundingSources::default()
            .context_block(&Embedder::offline(), "anything")
            .await;
        assert!(block.is_empty());
    }

    #[tokio::test]
    async fn test_grounded_question_falls_back_without_backend() {
        let question = grounded_question(
            &Generator::disabled(),
            &Embedder::offline(),
            &GroundingSources::default(),
            "backend",
            "medium",
        )
        .await;
        assert_eq!(question, "Tell me about your experience with backend.");
    }

    #[tokio::test]
    async fn test_grounded_question_uses_generation() {
        let generator = Generator::new(
            Some(Arc::new(ScriptedGateway::new(["How would you version a public API?"]))),
            std::time::Duration::from_secs(5),
        );
        let question = grounded_question(
            &generator,
            &Embedder::offline(),
            &GroundingSources::default(),
            "backend",
            "hard",
        )
        .await;
        assert_eq!(question, "How would you version a public API?");
    }
}
