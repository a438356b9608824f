//! Persistence collaborators. The interview core only sees these traits;
//! `main` picks `PgStore` when `DATABASE_URL` is set and `MemoryStore` otherwise.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::evaluation::{EvaluationResult, SessionSummary};
use crate::retrieval::vector::RetrievedItem;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Résumé chunks and domain knowledge-base articles, stored with their embeddings.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Appends articles to `domain`; returns how many were stored.
    async fn add_kb_articles(&self, domain: &str, items: Vec<RetrievedItem>) -> Result<usize>;

    /// Up to `limit` articles of `domain`, in insertion order.
    async fn kb_articles(&self, domain: &str, limit: usize) -> Result<Vec<RetrievedItem>>;

    /// Stores a résumé document and its embedded chunks; returns the document id.
    async fn add_cv(&self, user_id: Uuid, text: &str, chunks: Vec<RetrievedItem>) -> Result<Uuid>;

    /// Up to `limit` chunks across the user's résumés, in chunk order.
    async fn cv_chunks(&self, user_id: Uuid, limit: usize) -> Result<Vec<RetrievedItem>>;

    /// Full text of the user's most recent résumé.
    async fn latest_cv_text(&self, user_id: Uuid) -> Result<Option<String>>;
}

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn save_evaluation(
        &self,
        session_id: Uuid,
        question: &str,
        answer: &str,
        result: &EvaluationResult,
    ) -> Result<()>;

    /// Every result tagged with `session_id`, in creation order.
    async fn load_evaluations(&self, session_id: Uuid) -> Result<Vec<EvaluationResult>>;
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn save_summary(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
    ) -> Result<()>;
}
