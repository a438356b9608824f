//! Axum route handlers for one-off evaluation and session bookkeeping.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::EvaluationJob;
use crate::models::evaluation::{EvaluationResult, SessionSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub session_id: Uuid,
    #[serde(default)]
    pub domain: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: Uuid,
    pub user_id: Option<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluate
///
/// Scores and stores one answer synchronously. Never fails on backend errors;
/// those degrade to the fallback score.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResult>, AppError> {
    if request.question.trim().is_empty() || request.answer.trim().is_empty() {
        return Err(AppError::Validation(
            "question and answer are required".to_string(),
        ));
    }

    let job = EvaluationJob {
        question: request.question.trim().to_string(),
        answer: request.answer.trim().to_string(),
    };
    let domain = Some(request.domain.trim()).filter(|d| !d.is_empty());
    let result = state.pipeline.run(request.session_id, domain, &job).await;

    Ok(Json(result))
}

/// POST /api/v1/sessions/start
pub async fn handle_start_session(
    State(_state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, AppError> {
    if request.user_id.is_nil() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    let session_id = Uuid::new_v4();
    info!("Started session {} for user {}", session_id, request.user_id);

    Ok(Json(StartSessionResponse {
        session_id,
        message: "Interview session started".to_string(),
    }))
}

/// POST /api/v1/sessions/end
///
/// Aggregates every stored evaluation of the session into a summary.
pub async fn handle_end_session(
    State(state): State<AppState>,
    Json(request): Json<EndSessionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = state
        .aggregator
        .finalize(request.session_id, request.user_id)
        .await?;
    Ok(Json(summary))
}
