// Prompts for per-answer evaluation.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub fn evaluation_system() -> String {
    format!("You are a strict but fair interview evaluator. {JSON_ONLY_SYSTEM}")
}

/// Appended after the QUESTION / ANSWER / CONTEXT block.
pub const EVALUATION_RUBRIC: &str = r#"RUBRIC (score each criterion from 1 to 5):
- Relevance (weight 0.25)
- Structure/STAR (weight 0.20)
- Technical Correctness (weight 0.30)
- Clarity & Conciseness (weight 0.15)
- Confidence & Tone (weight 0.10)

Return a JSON object with this EXACT schema:
{
  "scores": [
    {"name": "Relevance", "score": 4},
    {"name": "Structure/STAR", "score": 3},
    {"name": "Technical Correctness", "score": 4},
    {"name": "Clarity & Conciseness", "score": 5},
    {"name": "Confidence & Tone", "score": 4}
  ],
  "overall": 78,
  "strengths": ["short phrase"],
  "weaknesses": ["short phrase"]
}

"overall" is a weighted judgement from 1 to 100."#;

pub fn evaluation_user(question: &str, answer: &str, context: &str) -> String {
    let context = if context.is_empty() { "(none)" } else { context };
    format!("QUESTION: {question}\nANSWER: {answer}\nCONTEXT:\n{context}\n\n{EVALUATION_RUBRIC}")
}
