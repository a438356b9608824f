//! Per-answer scoring and session-level aggregation.
//!
//! The live interview hands each completed turn to `EvaluationPool`, which
//! runs `EvaluationPipeline` in the background. At session end
//! `SessionAggregator` reduces whatever results exist into a `SessionSummary`.

pub mod aggregator;
pub mod evaluator;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use aggregator::SessionAggregator;
pub use evaluator::Evaluator;
pub use pipeline::{EvaluationPipeline, EvaluationPool};
