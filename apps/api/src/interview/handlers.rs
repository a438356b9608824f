//! WebSocket entry point for live interviews.

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::interview::session::{run_session, SessionParams, WsTransport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LiveInterviewQuery {
    pub user_id: Option<Uuid>,
    pub domain: Option<String>,
}

impl LiveInterviewQuery {
    fn into_params(self) -> SessionParams {
        SessionParams {
            session_id: Uuid::new_v4(),
            user_id: self.user_id,
            domain: self
                .domain
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

/// GET /api/v1/interview/live?user_id=&domain=
///
/// Upgrades to a WebSocket and runs one interview session on it.
pub async fn handle_live_interview(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<LiveInterviewQuery>,
) -> Response {
    let params = query.into_params();
    ws.on_upgrade(move |socket| async move {
        let mut transport = WsTransport::new(socket, state.config.session_idle_timeout);
        let outcome = run_session(&state, params, &mut transport, StdRng::from_entropy()).await;
        info!(
            "Live interview finished: {} turns, completed: {}, overall score: {:?}",
            outcome.turns,
            outcome.closed_by_interviewer,
            outcome.summary.map(|s| s.overall_score)
        );
    })
}
