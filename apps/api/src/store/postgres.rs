//! PostgreSQL-backed stores. Embeddings and evaluation results are JSONB.
//!
//! Expected tables:
//! - `kb_articles (id, domain, title, text, embedding, created_at)`
//! - `cv_documents (id, user_id, text, created_at)`
//! - `cv_chunks (cv_id, ord, chunk_text, embedding)`
//! - `evaluations (session_id, question, answer, result_json, created_at)`
//! - `session_feedback (session_id, user_id, overall_score, technical_score,
//!    communication_score, confidence_score, behavioral_score, text_feedback, created_at)`

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{EvaluationStore, KnowledgeStore, SummaryStore};
use crate::models::evaluation::{EvaluationResult, SessionSummary};
use crate::models::knowledge::EmbeddedTextRow;
use crate::retrieval::vector::RetrievedItem;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeStore for PgStore {
    async fn add_kb_articles(&self, domain: &str, items: Vec<RetrievedItem>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for (i, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO kb_articles (id, domain, title, text, embedding)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(domain)
            .bind(format!("seed-{}", i + 1))
            .bind(&item.text)
            .bind(Json(&item.embedding))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(items.len())
    }

    async fn kb_articles(&self, domain: &str, limit: usize) -> Result<Vec<RetrievedItem>> {
        let rows = sqlx::query_as::<_, EmbeddedTextRow>(
            "SELECT text, embedding FROM kb_articles WHERE domain = $1 ORDER BY created_at LIMIT $2",
        )
        .bind(domain)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RetrievedItem::from).collect())
    }

    async fn add_cv(&self, user_id: Uuid, text: &str, chunks: Vec<RetrievedItem>) -> Result<Uuid> {
        let cv_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO cv_documents (id, user_id, text) VALUES ($1, $2, $3)")
            .bind(cv_id)
            .bind(user_id)
            .bind(text)
            .execute(&mut *tx)
            .await?;

        for (ord, chunk) in chunks.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cv_chunks (cv_id, ord, chunk_text, embedding)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(cv_id)
            .bind(ord as i32)
            .bind(&chunk.text)
            .bind(Json(&chunk.embedding))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Stored CV {} with {} chunks for user {}", cv_id, chunks.len(), user_id);
        Ok(cv_id)
    }

    async fn cv_chunks(&self, user_id: Uuid, limit: usize) -> Result<Vec<RetrievedItem>> {
        let rows = sqlx::query_as::<_, EmbeddedTextRow>(
            r#"
            SELECT c.chunk_text AS text, c.embedding
            FROM cv_chunks c
            JOIN cv_documents d ON d.id = c.cv_id
            WHERE d.user_id = $1
            ORDER BY d.created_at, c.ord
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RetrievedItem::from).collect())
    }

    async fn latest_cv_text(&self, user_id: Uuid) -> Result<Option<String>> {
        let text = sqlx::query_scalar::<_, String>(
            "SELECT text FROM cv_documents WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(text)
    }
}

#[async_trait]
impl EvaluationStore for PgStore {
    async fn save_evaluation(
        &self,
        session_id: Uuid,
        question: &str,
        answer: &str,
        result: &EvaluationResult,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO evaluations (session_id, question, answer, result_json)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(question)
        .bind(answer)
        .bind(Json(result))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store evaluation for session {session_id}"))?;
        Ok(())
    }

    async fn load_evaluations(&self, session_id: Uuid) -> Result<Vec<EvaluationResult>> {
        let rows = sqlx::query_scalar::<_, Json<EvaluationResult>>(
            r#"
            SELECT result_json
            FROM evaluations
            WHERE session_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl SummaryStore for PgStore {
    async fn save_summary(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session_feedback
                (session_id, user_id, overall_score, technical_score, communication_score,
                 confidence_score, behavioral_score, text_feedback)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (session_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                technical_score = EXCLUDED.technical_score,
                communication_score = EXCLUDED.communication_score,
                confidence_score = EXCLUDED.confidence_score,
                behavioral_score = EXCLUDED.behavioral_score,
                text_feedback = EXCLUDED.text_feedback
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(summary.overall_score)
        .bind(summary.avg_technical)
        .bind(summary.avg_communication)
        .bind(summary.avg_confidence)
        .bind(summary.behavioral_score)
        .bind(&summary.feedback)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store summary for session {session_id}"))?;
        Ok(())
    }
}
