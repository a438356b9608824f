// Shared prompt constants and prompt-building utilities.
// Each module that needs generation calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Style rules shared by every spoken interviewer line.
pub const SPOKEN_STYLE: &str = "Sound like a human interviewer, not an AI. \
    No emojis. No bullet points. No lists.";

/// Renders a list of strings as one `- item` line each, or `(none)`.
pub fn bullet_block(items: &[String]) -> String {
    let rows: Vec<String> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("- {s}"))
        .collect();
    if rows.is_empty() {
        "(none)".to_string()
    } else {
        rows.join("\n")
    }
}
