//! Duplicate-question guard and project picker.

use crate::interview::state::QuestionType;

/// How many recent questions the guard compares against.
pub const NOVELTY_WINDOW: usize = 4;

const SHARED_PHRASES: &[&str] = &["explain", "describe", "how did you", "project"];
const LONG_WORD_OVERLAP_LIMIT: usize = 4;

/// True when `candidate` repeats the opening word, a stock phrase, or several
/// long words of any recent question.
pub fn too_similar(candidate: &str, recent: &[String]) -> bool {
    let candidate = candidate.to_lowercase();
    let candidate_words: Vec<&str> = candidate.split_whitespace().collect();

    recent.iter().any(|previous| {
        let previous = previous.to_lowercase();
        let previous_words: Vec<&str> = previous.split_whitespace().collect();

        if let (Some(a), Some(b)) = (candidate_words.first(), previous_words.first()) {
            if a == b {
                return true;
            }
        }

        if SHARED_PHRASES
            .iter()
            .any(|p| candidate.contains(p) && previous.contains(p))
        {
            return true;
        }

        let shared_long_words = candidate_words
            .iter()
            .filter(|w| w.chars().count() > 4)
            .filter(|w| previous_words.contains(w))
            .count();
        shared_long_words >= LONG_WORD_OVERLAP_LIMIT
    })
}

const TECHNICAL_PROJECT_HINTS: &[&str] = &["api", "backend", "integration", "real-time"];

/// Technical turns prefer a project mentioning an integration-style keyword;
/// otherwise the longest (most detailed) project wins, earliest on ties.
pub fn pick_relevant_project(projects: &[String], kind: QuestionType) -> Option<&str> {
    if kind == QuestionType::Technical {
        let hinted = projects.iter().find(|p| {
            let lower = p.to_lowercase();
            TECHNICAL_PROJECT_HINTS.iter().any(|h| lower.contains(h))
        });
        if let Some(project) = hinted {
            return Some(project);
        }
    }

    projects
        .iter()
        .fold(None::<&String>, |best, p| match best {
            Some(b) if b.chars().count() >= p.chars().count() => Some(b),
            _ => Some(p),
        })
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_first_word_rejected() {
        let prev = recent(&["Walk me through your last release."]);
        assert!(too_similar("walk us through a tricky bug.", &prev));
    }

    #[test]
    fn test_identical_question_rejected() {
        let q = "Which database did you pick for the ledger service?";
        assert!(too_similar(q, &recent(&[q])));
    }

    #[test]
    fn test_shared_stock_phrases_rejected() {
        let prev = recent(&["Can you explain how caching works?"]);
        assert!(too_similar("Could you explain sharding?", &prev));

        let prev = recent(&["So, how did you scale it?"]);
        assert!(too_similar("And how did you test it?", &prev));

        let prev = recent(&["Which project are you proudest of?"]);
        assert!(too_similar("What was hard about that project?", &prev));
    }

    #[test]
    fn test_long_word_overlap_rejected() {
        let prev = recent(&["Tell me about scaling distributed payment services globally"]);
        assert!(too_similar(
            "Were distributed payment services scaling smoothly?",
            &prev
        ));
    }

    #[test]
    fn test_fresh_question_accepted() {
        let prev = recent(&[
            "Tell me about yourself.",
            "What motivated you to apply?",
        ]);
        assert!(!too_similar("Which testing strategy suits a small team?", &prev));
        assert!(!too_similar("Anything at all?", &[]));
    }

    #[test]
    fn test_technical_prefers_api_project() {
        let projects = recent(&[
            "A very long and detailed portfolio website with animations and blog",
            "Realtime chat backend",
        ]);
        assert_eq!(
            pick_relevant_project(&projects, QuestionType::Technical),
            Some("Realtime chat backend")
        );
    }

    #[test]
    fn test_other_types_pick_longest_project() {
        let projects = recent(&["Chat API", "Inventory system for a grocery chain", "Blog"]);
        assert_eq!(
            pick_relevant_project(&projects, QuestionType::Experience),
            Some("Inventory system for a grocery chain")
        );
        assert_eq!(pick_relevant_project(&[], QuestionType::Technical), None);
    }
}
