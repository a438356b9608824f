use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score for one (question, answer) pair. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 0 – 100
    pub overall: f64,
    pub technical_score: f64,
    pub communication_score: f64,
    pub confidence_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// Session-level report reduced from every `EvaluationResult` of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub overall_score: f64,
    pub avg_technical: f64,
    pub avg_communication: f64,
    pub avg_confidence: f64,
    /// mean(avg_communication, avg_confidence)
    pub behavioral_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub feedback: String,
    pub evaluated_turns: usize,
    pub created_at: DateTime<Utc>,
}
