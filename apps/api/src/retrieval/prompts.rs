// Prompts for the stand-alone grounded question endpoint.

pub fn grounded_question_system(domain: &str) -> String {
    format!(
        "You are a strict but fair interviewer in the {domain} domain. \
        Ask ONE question (<=2 sentences). Use CONTEXT if needed. Do not reveal answers."
    )
}

pub fn grounded_question_user(context: &str, difficulty: &str) -> String {
    format!(
        "CONTEXT:\n{context}\n---\nDifficulty: {difficulty}\n\
        Return exactly one interview question now."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_braces_are_not_expanded() {
        let prompt = grounded_question_user("Rated {difficulty} by peers", "hard");
        assert!(prompt.starts_with("CONTEXT:\nRated {difficulty} by peers\n---"));
        assert!(prompt.contains("Difficulty: hard\n"));
    }
}
