//! Everything the interviewer says that is not a planned question: the opening,
//! acknowledgements, rephrasings, follow-ups, answers to candidate questions
//! and the closing. Each line has a fixed fallback.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::interview::classify::{classify, Signal};
use crate::interview::profile::CandidateProfile;
use crate::interview::prompts::{
    acknowledgement_user, candidate_question_user, closing_system, closing_user, follow_up_user,
    rephrase_user, ACKNOWLEDGEMENT_SYSTEM, CANDIDATE_QUESTION_SYSTEM, FOLLOW_UP_SYSTEM,
    OPENING_SYSTEM, OPENING_USER, REPHRASE_SYSTEM,
};
use crate::llm_client::{Generator, PromptSpec};

pub const OPENING_FALLBACK: &str = "Hi there, I'm your interviewer today. We'll go through some \
    general questions and then some based on your CV. Before we dive in, how are you feeling today?";

pub const CANDIDATE_QUESTION_INVITE: &str =
    "Before we wrap up, do you have any questions for us about the role or the company?";

pub const CLOSING_FALLBACK: &str =
    "Thank you for your time today. This concludes the interview and we will follow up with you soon.";
const CLOSING_ERROR_FALLBACK: &str =
    "Thank you for your time. We will stay in touch with the next steps.";
pub const EMPATHETIC_CLOSING: &str = "Thank you for sharing your thoughts today. You expressed \
    yourself well, and we appreciate the effort you put into this interview.";

const CANDIDATE_ANSWER_FALLBACK: &str =
    "Great question. The hiring team will share more specifics with you in the next interview stage.";
const EMPTY_CANDIDATE_QUESTION_REPLY: &str = "Those are great questions, and the hiring manager \
    will share more details with you in the next stage.";

const REPHRASE_WITHOUT_QUESTION: &str = "Let me phrase that differently: could you walk me \
    through your thought process in that situation?";

pub const NEUTRAL_ACKS: &[&str] = &[
    "Alright.",
    "I understand.",
    "Okay.",
    "Good to know.",
    "Got it.",
    "That makes sense.",
    "Thanks for sharing that.",
];

pub const EMPATHETIC_ACKS: &[&str] = &[
    "I understand how that could feel stressful.",
    "I hear you, and that's completely valid.",
    "I get that this can feel a bit overwhelming.",
];

/// Answers shorter than this get a canned acknowledgement.
const SHORT_ANSWER_CHARS: usize = 25;
/// Recent questions included in the closing prompt.
const CLOSING_HISTORY: usize = 8;

#[derive(Clone)]
pub struct Utterances {
    generator: Generator,
}

impl Utterances {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub fn backend_enabled(&self) -> bool {
        self.generator.is_enabled()
    }

    pub async fn opening(&self) -> String {
        let prompt = PromptSpec::new("opening", OPENING_SYSTEM, OPENING_USER)
            .temperature(0.4)
            .max_tokens(200)
            .timeout_secs(20);
        self.generator
            .generate(&prompt)
            .await
            .unwrap_or_else(|| OPENING_FALLBACK.to_string())
    }

    /// Short reaction to an answer. Never restates what the candidate said.
    pub async fn acknowledgement(
        &self,
        answer: &str,
        last_question: &str,
        rng: &mut StdRng,
    ) -> String {
        let answer = answer.trim();
        if answer.is_empty() {
            return pick(NEUTRAL_ACKS, rng);
        }
        if classify(answer) == Signal::Emotional {
            return pick(EMPATHETIC_ACKS, rng);
        }
        if answer.chars().count() < SHORT_ANSWER_CHARS {
            return pick(NEUTRAL_ACKS, rng);
        }

        let prompt = PromptSpec::new(
            "acknowledgement",
            ACKNOWLEDGEMENT_SYSTEM,
            acknowledgement_user(answer, last_question),
        )
        .temperature(0.2)
        .max_tokens(50)
        .timeout_secs(15);
        match self.generator.generate(&prompt).await {
            Some(ack) => ack,
            None => pick(NEUTRAL_ACKS, rng),
        }
    }

    /// A reframed version of `last_question` for a confused candidate.
    pub async fn rephrase(&self, last_question: &str, candidate_said: &str) -> String {
        let original = last_question.trim();
        if original.is_empty() {
            return REPHRASE_WITHOUT_QUESTION.to_string();
        }
        if !self.generator.is_enabled() {
            return format!("Let me say it a different way: {original}");
        }

        let prompt = PromptSpec::new(
            "rephrase",
            REPHRASE_SYSTEM,
            rephrase_user(original, candidate_said),
        )
        .temperature(0.3)
        .max_tokens(100)
        .timeout_secs(10);
        self.generator
            .generate(&prompt)
            .await
            .unwrap_or_else(|| format!("Let me rephrase that: {original}"))
    }

    /// Same-topic follow-up of at most nine words. `None` means advance normally.
    pub async fn follow_up(
        &self,
        last_question: &str,
        answer: &str,
        recent: &[String],
    ) -> Option<String> {
        let prompt = PromptSpec::new(
            "follow_up",
            FOLLOW_UP_SYSTEM,
            follow_up_user(last_question, answer, recent),
        )
        .temperature(0.25)
        .max_tokens(50)
        .timeout_secs(10);
        let follow_up = self.generator.generate(&prompt).await?;
        Some(limit_words(&follow_up, 9))
    }

    pub async fn answer_candidate_question(
        &self,
        question: &str,
        profile: &CandidateProfile,
    ) -> String {
        let question = question.trim();
        if question.is_empty() {
            return EMPTY_CANDIDATE_QUESTION_REPLY.to_string();
        }
        let prompt = PromptSpec::new(
            "candidate_question",
            CANDIDATE_QUESTION_SYSTEM,
            candidate_question_user(question, profile),
        )
        .temperature(0.4)
        .max_tokens(150)
        .timeout_secs(20);
        self.generator
            .generate(&prompt)
            .await
            .unwrap_or_else(|| CANDIDATE_ANSWER_FALLBACK.to_string())
    }

    /// Empathetic fixed closing when the last message carried any emotional signal.
    pub async fn closing(
        &self,
        profile: &CandidateProfile,
        last_message: &str,
        asked: &[String],
        signal: Signal,
    ) -> String {
        if signal.is_emotional() {
            return EMPATHETIC_CLOSING.to_string();
        }
        if !self.generator.is_enabled() {
            return CLOSING_FALLBACK.to_string();
        }

        let start = asked.len().saturating_sub(CLOSING_HISTORY);
        let prompt = PromptSpec::new(
            "closing",
            closing_system(),
            closing_user(profile, last_message, &asked[start..]),
        )
        .temperature(0.3)
        .max_tokens(150)
        .timeout_secs(15);
        self.generator
            .generate(&prompt)
            .await
            .unwrap_or_else(|| CLOSING_ERROR_FALLBACK.to_string())
    }
}

fn pick(phrases: &[&str], rng: &mut StdRng) -> String {
    phrases.choose(rng).copied().unwrap_or("Okay.").to_string()
}

fn limit_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    let mut clipped = words[..max_words].join(" ");
    let trimmed_len = clipped
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '.'))
        .len();
    clipped.truncate(trimmed_len);
    if !clipped.ends_with('?') {
        clipped.push('?');
    }
    clipped
}
