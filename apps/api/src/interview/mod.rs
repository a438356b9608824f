//! Live interview core: keyword classification, the per-session state machine,
//! question planning with a novelty guard, and the WebSocket session loop.

pub mod classify;
pub mod engine;
pub mod handlers;
pub mod novelty;
pub mod planner;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod state;
pub mod utterances;
