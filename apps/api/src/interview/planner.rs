//! QuestionPlanner: picks the question type for the current turn and produces
//! the concrete question text.
//!
//! Order of preference for generated types:
//! 1. CV-tailored question (needs a non-empty profile and a backend)
//! 2. Generic templated question, grounded in the retrieval context block
//! 3. Hardcoded per-type question
//!
//! The first generated candidate goes through the novelty guard; a rejected
//! candidate gets exactly one CV-tailored retry.

use tracing::{debug, info};

use crate::interview::novelty::{pick_relevant_project, too_similar, NOVELTY_WINDOW};
use crate::interview::profile::CandidateProfile;
use crate::interview::prompts::{
    cv_tailored_user, generic_question_system, generic_question_user, CV_TAILORED_SYSTEM,
};
use crate::interview::state::{InterviewState, QuestionType};
use crate::llm_client::{Generator, PromptSpec};
use crate::retrieval::embedder::Embedder;
use crate::retrieval::GroundingSources;

pub const PERSONAL_INTRO_QUESTION: &str =
    "To start off, could you tell me a bit about yourself and your background?";
pub const MOTIVATION_QUESTION: &str =
    "What motivated you to apply for this type of role and work in this kind of environment?";

/// Used when no generated question is available.
pub fn fallback_question(kind: QuestionType) -> &'static str {
    match kind {
        QuestionType::PersonalIntro => PERSONAL_INTRO_QUESTION,
        QuestionType::Motivation => MOTIVATION_QUESTION,
        QuestionType::Technical => {
            "Could you describe a technical challenge from one of your projects and how you solved it?"
        }
        QuestionType::Scenario => {
            "Imagine you join a project that is behind schedule. What would you do first?"
        }
        QuestionType::Behavioral => {
            "Tell me about a time you had a conflict with someone at work and how you handled it."
        }
        QuestionType::Experience => {
            "Could you walk me through one of the main projects on your CV and your contribution?"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuestion {
    pub kind: QuestionType,
    pub text: String,
}

pub struct QuestionPlanner {
    generator: Generator,
    embedder: Embedder,
    profile: CandidateProfile,
    sources: GroundingSources,
    domain: Option<String>,
}

impl QuestionPlanner {
    pub fn new(
        generator: Generator,
        embedder: Embedder,
        profile: CandidateProfile,
        sources: GroundingSources,
        domain: Option<String>,
    ) -> Self {
        Self {
            generator,
            embedder,
            profile,
            sources,
            domain,
        }
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    /// Question for `state.turn`. Reads the state, never writes it.
    pub async fn plan(&self, state: &InterviewState) -> PlannedQuestion {
        let kind = QuestionType::for_turn(state.turn);
        let text = match kind {
            QuestionType::PersonalIntro | QuestionType::Motivation => {
                fallback_question(kind).to_string()
            }
            _ => self.generated_question(kind, state).await,
        };
        debug!("Turn {} planned as {}", state.turn, kind.as_str());
        PlannedQuestion { kind, text }
    }

    async fn generated_question(&self, kind: QuestionType, state: &InterviewState) -> String {
        let recent = state.recent_questions(NOVELTY_WINDOW);

        let first = match self.cv_tailored(kind, recent).await {
            Some(q) => Some(q),
            None => self.generic(kind, state).await,
        };

        let Some(first) = first else {
            return fallback_question(kind).to_string();
        };

        if !too_similar(&first, recent) {
            return first;
        }

        info!("Question rejected by novelty guard, retrying once");
        // the retry is kept even if it is also similar
        self.cv_tailored(kind, recent).await.unwrap_or(first)
    }

    async fn cv_tailored(&self, kind: QuestionType, recent: &[String]) -> Option<String> {
        if self.profile.is_empty() || !self.generator.is_enabled() {
            return None;
        }
        let prompt = PromptSpec::new(
            "cv_tailored_question",
            CV_TAILORED_SYSTEM,
            cv_tailored_user(&self.profile, recent, kind),
        )
        .temperature(0.4)
        .max_tokens(200)
        .timeout_secs(30);
        self.generator.generate(&prompt).await
    }

    async fn generic(&self, kind: QuestionType, state: &InterviewState) -> Option<String> {
        if !self.generator.is_enabled() {
            return None;
        }

        let topic = self
            .domain
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(self.profile.field.as_str());
        let context = self
            .sources
            .context_block(&self.embedder, &format!("{} interview question for {topic}", kind.as_str()))
            .await;

        let prompt = PromptSpec::new(
            "generic_question",
            generic_question_system(),
            generic_question_user(
                &self.profile,
                pick_relevant_project(&self.profile.projects, kind),
                &state.asked,
                &context,
                kind,
            ),
        )
        .temperature(0.5)
        .max_tokens(200)
        .timeout_secs(30);
        self.generator.generate(&prompt).await
    }
}
