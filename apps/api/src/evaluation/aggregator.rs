//! SessionAggregator: reduces a session's evaluation results into one summary.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::evaluation::{EvaluationResult, SessionSummary};
use crate::store::{EvaluationStore, SummaryStore};

/// Strengths and weaknesses carried into the summary, each.
const MAX_LISTED: usize = 5;

/// Pure reduction. Each metric is averaged only over results where it is > 0.
pub fn aggregate(session_id: Uuid, results: &[EvaluationResult]) -> SessionSummary {
    let avg_technical = positive_mean(results.iter().map(|r| r.technical_score));
    let avg_communication = positive_mean(results.iter().map(|r| r.communication_score));
    let avg_confidence = positive_mean(results.iter().map(|r| r.confidence_score));
    let behavioral_score = (avg_communication + avg_confidence) / 2.0;

    let strengths = first_listed(results.iter().flat_map(|r| r.strengths.iter()));
    let weaknesses = first_listed(results.iter().flat_map(|r| r.weaknesses.iter()));

    let mut feedback = format!(
        "Technical: {avg_technical:.1}%, Communication: {avg_communication:.1}%, Confidence: {avg_confidence:.1}%"
    );
    if !strengths.is_empty() {
        feedback.push_str(&format!("\n\nStrengths: {}", strengths.join(", ")));
    }
    if !weaknesses.is_empty() {
        feedback.push_str(&format!("\n\nAreas for improvement: {}", weaknesses.join(", ")));
    }

    SessionSummary {
        session_id,
        overall_score: (avg_technical + behavioral_score) / 2.0,
        avg_technical,
        avg_communication,
        avg_confidence,
        behavioral_score,
        strengths,
        weaknesses,
        feedback,
        evaluated_turns: results.len(),
        created_at: Utc::now(),
    }
}

fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn first_listed<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    items
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_LISTED)
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct SessionAggregator {
    evaluations: Arc<dyn EvaluationStore>,
    summaries: Arc<dyn SummaryStore>,
}

impl SessionAggregator {
    pub fn new(evaluations: Arc<dyn EvaluationStore>, summaries: Arc<dyn SummaryStore>) -> Self {
        Self {
            evaluations,
            summaries,
        }
    }

    /// Loads, reduces and (when the user is known) stores the summary.
    /// A failed save is logged; the summary is still returned.
    pub async fn finalize(&self, session_id: Uuid, user_id: Option<Uuid>) -> Result<SessionSummary> {
        let results = self.evaluations.load_evaluations(session_id).await?;
        let summary = aggregate(session_id, &results);

        match user_id {
            Some(user_id) => {
                if let Err(e) = self.summaries.save_summary(session_id, user_id, &summary).await {
                    warn!("Failed to store summary for session {session_id}: {e:#}");
                } else {
                    info!(
                        "Stored summary for session {} ({} evaluated turns, overall {:.1})",
                        session_id, summary.evaluated_turns, summary.overall_score
                    );
                }
            }
            None => info!("Session {session_id} has no user; summary not stored"),
        }

        Ok(summary)
    }
}
