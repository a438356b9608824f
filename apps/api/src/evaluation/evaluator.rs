//! Rubric scoring of one (question, answer) pair.
//!
//! With a backend: strict-JSON rubric, criteria folded into three sub-scores.
//! Without one: a length heuristic. Any call or parse failure degrades to a
//! fixed overall score; evaluation never returns an error.

use serde::Deserialize;
use tracing::warn;

use crate::evaluation::prompts::{evaluation_system, evaluation_user};
use crate::llm_client::{extract_json_object, Generator, PromptSpec};
use crate::models::evaluation::EvaluationResult;

/// Overall score used when the rubric call or its JSON fails.
pub const FALLBACK_OVERALL: f64 = 70.0;

const TECHNICAL_SHARE: f64 = 0.4;
const COMMUNICATION_SHARE: f64 = 0.3;
const CONFIDENCE_SHARE: f64 = 0.3;
/// 1–5 criterion score → 0–100 scale.
const CRITERION_SCALE: f64 = 20.0;

#[derive(Debug, Deserialize)]
struct RubricReply {
    #[serde(default)]
    scores: Vec<CriterionScore>,
    overall: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CriterionScore {
    name: String,
    score: f64,
}

#[derive(Clone)]
pub struct Evaluator {
    generator: Generator,
}

impl Evaluator {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub async fn evaluate(&self, question: &str, answer: &str, domain_context: &str) -> EvaluationResult {
        if !self.generator.is_enabled() {
            return heuristic_result(answer);
        }

        let prompt = PromptSpec::new(
            "evaluation",
            evaluation_system(),
            evaluation_user(question, answer, domain_context),
        )
        .temperature(0.0)
        .max_tokens(600)
        .timeout_secs(60);

        let Some(raw) = self.generator.generate(&prompt).await else {
            return fallback_result();
        };

        match parse_rubric(&raw) {
            Some(result) => result,
            None => {
                warn!("Evaluation reply was not valid rubric JSON; using fallback score");
                fallback_result()
            }
        }
    }
}

/// Fixed score for failed evaluations.
pub fn fallback_result() -> EvaluationResult {
    split_overall(FALLBACK_OVERALL, Vec::new(), Vec::new())
}

/// Length-based score used when no backend is configured.
pub fn heuristic_result(answer: &str) -> EvaluationResult {
    let length = answer.trim().chars().count();
    let mut overall = FALLBACK_OVERALL;
    let mut strengths = vec!["Good response".to_string()];
    let mut weaknesses = Vec::new();

    if length > 50 {
        overall += 10.0;
        strengths.push("Detailed response".to_string());
    } else if length < 20 {
        overall -= 10.0;
        weaknesses.push("Answer too brief".to_string());
    }

    split_overall(overall, strengths, weaknesses)
}

fn split_overall(overall: f64, strengths: Vec<String>, weaknesses: Vec<String>) -> EvaluationResult {
    EvaluationResult {
        overall,
        technical_score: overall * TECHNICAL_SHARE,
        communication_score: overall * COMMUNICATION_SHARE,
        confidence_score: overall * CONFIDENCE_SHARE,
        strengths,
        weaknesses,
    }
}

/// Folds named criteria into sub-scores; missing groups fall back to shares of `overall`.
pub fn parse_rubric(raw: &str) -> Option<EvaluationResult> {
    let json = extract_json_object(raw)?;
    let reply: RubricReply = serde_json::from_str(json).ok()?;
    let overall = reply.overall.clamp(0.0, 100.0);

    let mut technical = Vec::new();
    let mut communication = None;
    let mut confidence = None;

    for criterion in &reply.scores {
        let name = criterion.name.to_lowercase();
        let score = criterion.score.clamp(0.0, 5.0);
        if ["technical", "relevance", "structure", "correctness"]
            .iter()
            .any(|k| name.contains(k))
        {
            technical.push(score);
        }
        if name.contains("communication") || name.contains("clarity") {
            communication = Some(score * CRITERION_SCALE);
        }
        if name.contains("confidence") || name.contains("tone") {
            confidence = Some(score * CRITERION_SCALE);
        }
    }

    let technical_score = if technical.is_empty() {
        overall * TECHNICAL_SHARE
    } else {
        technical.iter().sum::<f64>() / technical.len() as f64 * CRITERION_SCALE
    };

    Some(EvaluationResult {
        overall,
        technical_score,
        communication_score: communication.unwrap_or(overall * COMMUNICATION_SHARE),
        confidence_score: confidence.unwrap_or(overall * CONFIDENCE_SHARE),
        strengths: reply.strengths,
        weaknesses: reply.weaknesses,
    })
}
