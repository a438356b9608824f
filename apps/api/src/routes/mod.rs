pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::interview::handlers as interview;
use crate::retrieval::handlers as retrieval;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Knowledge base and résumés
        .route("/api/v1/kb/seed", post(retrieval::handle_seed_kb))
        .route("/api/v1/cv/ingest", post(retrieval::handle_ingest_cv))
        .route(
            "/api/v1/questions/next",
            post(retrieval::handle_next_question),
        )
        // Evaluation and sessions
        .route("/api/v1/evaluate", post(evaluation::handle_evaluate))
        .route(
            "/api/v1/sessions/start",
            post(evaluation::handle_start_session),
        )
        .route("/api/v1/sessions/end", post(evaluation::handle_end_session))
        // Live interview (WebSocket)
        .route(
            "/api/v1/interview/live",
            get(interview::handle_live_interview),
        )
        .with_state(state)
}
