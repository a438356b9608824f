//! Axum route handlers for knowledge-base seeding, résumé ingestion and
//! stand-alone grounded questions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::retrieval::{grounded_question, ingest_cv, seed_knowledge_base, GroundingSources};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SeedKbRequest {
    pub domain: String,
    pub items: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeedKbResponse {
    pub ok: bool,
    pub inserted: usize,
}

#[derive(Debug, Deserialize)]
pub struct IngestCvRequest {
    pub user_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct IngestCvResponse {
    pub ok: bool,
    pub cv_id: Uuid,
    pub chunks: usize,
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionRequest {
    pub user_id: Uuid,
    pub domain: String,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub question: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/kb/seed
pub async fn handle_seed_kb(
    State(state): State<AppState>,
    Json(request): Json<SeedKbRequest>,
) -> Result<Json<SeedKbResponse>, AppError> {
    if request.domain.trim().is_empty() || request.items.is_empty() {
        return Err(AppError::Validation(
            "domain and items are required".to_string(),
        ));
    }

    let inserted = seed_knowledge_base(
        state.knowledge.as_ref(),
        &state.embedder,
        request.domain.trim(),
        &request.items,
    )
    .await?;

    Ok(Json(SeedKbResponse { ok: true, inserted }))
}

/// POST /api/v1/cv/ingest
pub async fn handle_ingest_cv(
    State(state): State<AppState>,
    Json(request): Json<IngestCvRequest>,
) -> Result<Json<IngestCvResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let (cv_id, chunks) = ingest_cv(
        state.knowledge.as_ref(),
        &state.embedder,
        request.user_id,
        &request.text,
    )
    .await?;

    info!("Ingested CV {} ({} chunks) for user {}", cv_id, chunks, request.user_id);
    Ok(Json(IngestCvResponse {
        ok: true,
        cv_id,
        chunks,
    }))
}

/// POST /api/v1/questions/next
///
/// Retrieves the closest résumé chunks and domain articles and asks for one question.
pub async fn handle_next_question(
    State(state): State<AppState>,
    Json(request): Json<NextQuestionRequest>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    let domain = request.domain.trim();
    if domain.is_empty() {
        return Err(AppError::Validation("domain cannot be empty".to_string()));
    }

    let sources =
        GroundingSources::load(state.knowledge.as_ref(), Some(request.user_id), Some(domain))
            .await?;

    let question = grounded_question(
        &state.chat,
        &state.embedder,
        &sources,
        domain,
        &request.difficulty,
    )
    .await;

    Ok(Json(NextQuestionResponse { question }))
}
