use serde::{Deserialize, Serialize};

/// Turn at which the interview stops asking and invites candidate questions.
pub const CANDIDATE_QUESTION_TURN: u32 = 9;

/// Kind of question asked on a given turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    PersonalIntro,
    Motivation,
    Technical,
    Scenario,
    Experience,
    Behavioral,
}

impl QuestionType {
    /// Fixed schedule keyed on the turn number.
    pub fn for_turn(turn: u32) -> Self {
        match turn {
            0 | 1 => QuestionType::PersonalIntro,
            2 => QuestionType::Motivation,
            3..=5 => QuestionType::Technical,
            6 => QuestionType::Scenario,
            7 => QuestionType::Experience,
            8 => QuestionType::Behavioral,
            t if t % 2 == 0 => QuestionType::Experience,
            _ => QuestionType::Scenario,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::PersonalIntro => "personal_intro",
            QuestionType::Motivation => "motivation",
            QuestionType::Technical => "technical",
            QuestionType::Scenario => "scenario",
            QuestionType::Experience => "experience",
            QuestionType::Behavioral => "behavioral",
        }
    }
}

/// Mutable per-session interview state. Owned by exactly one `ConversationEngine`.
#[derive(Debug, Clone, Default)]
pub struct InterviewState {
    /// Completed answers; only the normal-advance branch increments it.
    pub turn: u32,
    /// Every question issued, including rephrasings and follow-ups, oldest first.
    pub asked: Vec<String>,
    pub last_question: String,
    pub last_user: String,
    pub tech_asked: u32,
    /// Once set, stays set for the rest of the session.
    pub in_candidate_q_phase: bool,
}

impl InterviewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Up to the last `n` asked questions, oldest first.
    pub fn recent_questions(&self, n: usize) -> &[String] {
        let start = self.asked.len().saturating_sub(n);
        &self.asked[start..]
    }

    pub fn record_question(&mut self, question: &str) {
        self.last_question = question.to_string();
        self.asked.push(question.to_string());
    }

    pub fn enter_candidate_q_phase(&mut self) {
        self.in_candidate_q_phase = true;
    }
}
