//! One live interview: the read/react loop around a `ConversationEngine`.
//!
//! The session task is the only writer of its engine's state. Evaluations are
//! handed to the shared `EvaluationPool` and never awaited inside the loop;
//! after the channel closes the session gives its own evaluations a grace
//! period to land, then aggregates.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::future::join_all;
use rand::rngs::StdRng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interview::engine::{ConversationEngine, Transition};
use crate::interview::planner::QuestionPlanner;
use crate::interview::profile::CandidateProfile;
use crate::interview::utterances::Utterances;
use crate::models::evaluation::SessionSummary;
use crate::retrieval::GroundingSources;
use crate::state::AppState;

/// How long a closed session waits for its evaluations before aggregating.
pub const EVALUATION_GRACE: Duration = Duration::from_secs(30);

/// Ordered, reliable text channel to the candidate.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next inbound text message, or `None` once the channel is closed or idle.
    async fn receive(&mut self) -> Option<String>;

    async fn close(&mut self) {}
}

pub struct WsTransport {
    socket: WebSocket,
    idle_timeout: Duration,
}

impl WsTransport {
    pub fn new(socket: WebSocket, idle_timeout: Duration) -> Self {
        Self {
            socket,
            idle_timeout,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<String> {
        loop {
            let frame = match tokio::time::timeout(self.idle_timeout, self.socket.recv()).await {
                Ok(frame) => frame,
                Err(_) => {
                    info!("Live session idle for {:?}, closing", self.idle_timeout);
                    return None;
                }
            };
            match frame {
                Some(Ok(Message::Text(text))) => return Some(text),
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue, // ping, pong, binary
                Some(Err(e)) => {
                    warn!("WebSocket read failed: {e}");
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.send(Message::Close(None)).await;
    }
}

#[derive(Debug, Clone)]
pub struct SessionParams {
    pub session_id: Uuid,
    pub user_id: Option<Uuid>,
    pub domain: Option<String>,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub turns: u32,
    pub closed_by_interviewer: bool,
    pub summary: Option<SessionSummary>,
}

/// Drives one session to completion. Never fails: every degraded path is logged.
pub async fn run_session<T: Transport>(
    state: &AppState,
    params: SessionParams,
    transport: &mut T,
    rng: StdRng,
) -> SessionOutcome {
    let SessionParams {
        session_id,
        user_id,
        domain,
    } = params;
    info!(
        "Live session {} opened (user: {:?}, domain: {:?})",
        session_id, user_id, domain
    );

    let profile = load_profile(state, user_id).await;
    let sources = GroundingSources::load(state.knowledge.as_ref(), user_id, domain.as_deref())
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load grounding sources for session {session_id}: {e:#}");
            GroundingSources::default()
        });

    let planner = QuestionPlanner::new(
        state.chat.clone(),
        state.embedder.clone(),
        profile,
        sources,
        domain.clone(),
    );
    let mut engine = ConversationEngine::new(
        planner,
        Utterances::new(state.chat.clone()),
        rng,
        state.config.follow_up_probability,
    );

    let mut pending = Vec::new();
    let mut closed_by_interviewer = false;

    let opening = engine.open().await;
    if transport.send(opening).await.is_ok() {
        'conversation: while let Some(message) = transport.receive().await {
            let reaction = engine.handle(&message).await;

            if let Some(job) = reaction.evaluation {
                pending.push(state.eval_pool.dispatch(session_id, domain.clone(), job));
            }
            for line in reaction.outgoing {
                if let Err(e) = transport.send(line).await {
                    warn!("Session {session_id} send failed: {e:#}");
                    break 'conversation;
                }
            }
            if reaction.transition == Transition::Closed {
                closed_by_interviewer = true;
                break;
            }
        }
    }
    transport.close().await;

    let turns = engine.state().turn;
    info!(
        "Live session {} closed in phase {:?} after {} turns ({} evaluations pending)",
        session_id,
        engine.phase(),
        turns,
        pending.len()
    );

    // handles are dropped, not aborted, when the grace period runs out
    if tokio::time::timeout(EVALUATION_GRACE, join_all(pending))
        .await
        .is_err()
    {
        warn!("Session {session_id}: evaluations still running after grace period; aggregating partial results");
    }

    let summary = match state.aggregator.finalize(session_id, user_id).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Failed to aggregate session {session_id}: {e:#}");
            None
        }
    };

    SessionOutcome {
        turns,
        closed_by_interviewer,
        summary,
    }
}

async fn load_profile(state: &AppState, user_id: Option<Uuid>) -> CandidateProfile {
    let Some(user_id) = user_id else {
        return CandidateProfile::default();
    };
    match state.knowledge.latest_cv_text(user_id).await {
        Ok(Some(text)) => state.profile_extractor.extract(&text).await,
        Ok(None) => CandidateProfile::default(),
        Err(e) => {
            warn!("Failed to load résumé for user {user_id}: {e:#}");
            CandidateProfile::default()
        }
    }
}
