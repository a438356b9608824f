use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EvaluationStore, KnowledgeStore, SummaryStore};
use crate::models::evaluation::{EvaluationResult, SessionSummary};
use crate::retrieval::vector::RetrievedItem;

struct CvDocument {
    text: String,
    chunks: Vec<RetrievedItem>,
}

/// Mirrors a row of the `evaluations` table. Only tests read the turn text back.
struct StoredEvaluation {
    #[cfg_attr(not(test), allow(dead_code))]
    question: String,
    #[cfg_attr(not(test), allow(dead_code))]
    answer: String,
    result: EvaluationResult,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    kb: HashMap<String, Vec<RetrievedItem>>,
    cvs: HashMap<Uuid, Vec<CvDocument>>,
    evaluations: HashMap<Uuid, Vec<StoredEvaluation>>,
    summaries: HashMap<Uuid, (Uuid, SessionSummary)>,
}

/// Process-local store used when no database is configured, and in tests.
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Stored summary for a session, with the user it was saved for.
    pub async fn summary(&self, session_id: Uuid) -> Option<(Uuid, SessionSummary)> {
        self.inner.read().await.summaries.get(&session_id).cloned()
    }

    #[cfg(test)]
    /// (question, answer) pairs evaluated for a session, in creation order.
    pub async fn evaluated_pairs(&self, session_id: Uuid) -> Vec<(String, String)> {
        self.inner
            .read()
            .await
            .evaluations
            .get(&session_id)
            .map(|rows| {
                rows.iter()
                    .map(|r| (r.question.clone(), r.answer.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeStore for MemoryStore {
    async fn add_kb_articles(&self, domain: &str, items: Vec<RetrievedItem>) -> Result<usize> {
        let count = items.len();
        self.inner
            .write()
            .await
            .kb
            .entry(domain.to_string())
            .or_default()
            .extend(items);
        Ok(count)
    }

    async fn kb_articles(&self, domain: &str, limit: usize) -> Result<Vec<RetrievedItem>> {
        Ok(self
            .inner
            .read()
            .await
            .kb
            .get(domain)
            .map(|items| items.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn add_cv(&self, user_id: Uuid, text: &str, chunks: Vec<RetrievedItem>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.inner
            .write()
            .await
            .cvs
            .entry(user_id)
            .or_default()
            .push(CvDocument {
                text: text.to_string(),
                chunks,
            });
        Ok(id)
    }

    async fn cv_chunks(&self, user_id: Uuid, limit: usize) -> Result<Vec<RetrievedItem>> {
        Ok(self
            .inner
            .read()
            .await
            .cvs
            .get(&user_id)
            .map(|docs| {
                docs.iter()
                    .flat_map(|d| d.chunks.iter().cloned())
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn latest_cv_text(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .inner
            .read()
            .await
            .cvs
            .get(&user_id)
            .and_then(|docs| docs.last())
            .map(|d| d.text.clone()))
    }
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    async fn save_evaluation(
        &self,
        session_id: Uuid,
        question: &str,
        answer: &str,
        result: &EvaluationResult,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .evaluations
            .entry(session_id)
            .or_default()
            .push(StoredEvaluation {
                question: question.to_string(),
                answer: answer.to_string(),
                result: result.clone(),
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn load_evaluations(&self, session_id: Uuid) -> Result<Vec<EvaluationResult>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<&StoredEvaluation> = inner
            .evaluations
            .get(&session_id)
            .map(|rows| rows.iter().collect())
            .unwrap_or_default();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows.into_iter().map(|r| r.result.clone()).collect())
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn save_summary(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .summaries
            .insert(session_id, (user_id, summary.clone()));
        Ok(())
    }
}
