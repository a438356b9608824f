//! ConversationEngine: the per-session interview state machine.
//!
//! `handle` maps one inbound candidate message onto a `Reaction`: the lines to
//! send back, the phase change (if any) and the evaluation job to dispatch.
//! The engine performs no transport I/O and never spawns anything; the
//! session loop does both.
//!
//! Branch priority per message:
//! 1. empty message → ignored
//! 2. confusion → rephrase, turn unchanged
//! 3. candidate-question phase → answer, close
//! 4. long answer + random roll → same-topic follow-up, turn unchanged
//! 5. normal advance → next question, or the candidate-question invite from turn 9

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::interview::classify::{classify, Signal};
use crate::interview::planner::QuestionPlanner;
use crate::interview::state::{InterviewState, QuestionType, CANDIDATE_QUESTION_TURN};
use crate::interview::utterances::{Utterances, CANDIDATE_QUESTION_INVITE};

/// Answers must be longer than this to be eligible for a follow-up.
const FOLLOW_UP_MIN_CHARS: usize = 40;
/// Answers must be longer than this to be acknowledged before the next question.
const ACK_MIN_CHARS: usize = 20;
/// Recent questions shown to the follow-up prompt.
const FOLLOW_UP_HISTORY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Greeting,
    Interviewing,
    CandidateQuestions,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    EnteredCandidateQuestions,
    Closed,
}

/// Immutable snapshot of one completed answer, handed to the evaluation pool.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationJob {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Lines to send, in order.
    pub outgoing: Vec<String>,
    pub transition: Transition,
    pub evaluation: Option<EvaluationJob>,
}

impl Reaction {
    fn silent() -> Self {
        Self::say(Vec::new())
    }

    fn say(outgoing: Vec<String>) -> Self {
        Self {
            outgoing,
            transition: Transition::None,
            evaluation: None,
        }
    }
}

pub struct ConversationEngine {
    state: InterviewState,
    planner: QuestionPlanner,
    utterances: Utterances,
    rng: StdRng,
    follow_up_probability: f64,
    closed: bool,
}

impl ConversationEngine {
    pub fn new(
        planner: QuestionPlanner,
        utterances: Utterances,
        rng: StdRng,
        follow_up_probability: f64,
    ) -> Self {
        Self {
            state: InterviewState::new(),
            planner,
            utterances,
            rng,
            follow_up_probability,
            closed: false,
        }
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.closed {
            Phase::Closed
        } else if self.state.in_candidate_q_phase {
            Phase::CandidateQuestions
        } else if self.state.turn == 0 {
            Phase::Greeting
        } else {
            Phase::Interviewing
        }
    }

    /// Greeting line. Becomes `last_question` but is not recorded in `asked`.
    pub async fn open(&mut self) -> String {
        let opening = self.utterances.opening().await;
        self.state.last_question = opening.clone();
        opening
    }

    pub async fn handle(&mut self, message: &str) -> Reaction {
        let message = message.trim();
        if self.closed || message.is_empty() {
            return Reaction::silent();
        }
        self.state.last_user = message.to_string();

        let signal = classify(message);

        if signal == Signal::Confused {
            let reply = self
                .utterances
                .rephrase(&self.state.last_question, message)
                .await;
            self.state.record_question(&reply);
            return Reaction::say(vec![reply]);
        }

        if self.state.in_candidate_q_phase {
            return self.close_with_answer(message, signal).await;
        }

        if let Some(follow_up) = self.maybe_follow_up(message).await {
            self.state.record_question(&follow_up);
            return Reaction::say(vec![follow_up]);
        }

        self.advance(message).await
    }

    async fn close_with_answer(&mut self, message: &str, signal: Signal) -> Reaction {
        let answer = self
            .utterances
            .answer_candidate_question(message, self.planner.profile())
            .await;
        self.state.record_question(&answer);

        let closing = self
            .utterances
            .closing(self.planner.profile(), message, &self.state.asked, signal)
            .await;
        self.closed = true;

        Reaction {
            outgoing: vec![answer, closing],
            transition: Transition::Closed,
            evaluation: None,
        }
    }

    async fn maybe_follow_up(&mut self, message: &str) -> Option<String> {
        if self.state.turn == 0
            || message.chars().count() <= FOLLOW_UP_MIN_CHARS
            || !self.utterances.backend_enabled()
        {
            return None;
        }
        // NaN and non-positive probabilities never roll
        let p = self.follow_up_probability;
        if !(p > 0.0 && self.rng.gen_bool(p.min(1.0))) {
            return None;
        }
        let recent = self.state.recent_questions(FOLLOW_UP_HISTORY);
        self.utterances
            .follow_up(&self.state.last_question, message, recent)
            .await
    }

    async fn advance(&mut self, message: &str) -> Reaction {
        let evaluation = Some(EvaluationJob {
            question: self.state.last_question.clone(),
            answer: message.to_string(),
        });
        self.state.turn += 1;

        if self.state.turn >= CANDIDATE_QUESTION_TURN {
            let ack = self
                .utterances
                .acknowledgement(message, &self.state.last_question, &mut self.rng)
                .await;
            let invite = join_lines(&ack, CANDIDATE_QUESTION_INVITE);
            self.state.record_question(&invite);
            self.state.enter_candidate_q_phase();
            debug!("Entered candidate-question phase at turn {}", self.state.turn);
            return Reaction {
                outgoing: vec![invite],
                transition: Transition::EnteredCandidateQuestions,
                evaluation,
            };
        }

        let planned = self.planner.plan(&self.state).await;
        if planned.kind == QuestionType::Technical {
            self.state.tech_asked += 1;
        }

        let ack = if message.chars().count() > ACK_MIN_CHARS {
            self.utterances
                .acknowledgement(message, &self.state.last_question, &mut self.rng)
                .await
        } else {
            String::new()
        };

        let outgoing = join_lines(&ack, &planned.text);
        self.state.record_question(&planned.text);

        Reaction {
            outgoing: vec![outgoing],
            transition: Transition::None,
            evaluation,
        }
    }
}

fn join_lines(first: &str, second: &str) -> String {
    format!("{} {}", first.trim(), second.trim())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::planner::{MOTIVATION_QUESTION, PERSONAL_INTRO_QUESTION};
    use crate::interview::profile::CandidateProfile;
    use crate::interview::utterances::{CLOSING_FALLBACK, EMPATHETIC_CLOSING, OPENING_FALLBACK};
    use crate::llm_client::Generator;
    use crate::retrieval::embedder::Embedder;
    use crate::retrieval::GroundingSources;
    use crate::test_support::ScriptedGateway;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;

    const ANSWERS: [&str; 10] = [
        "I'm doing well, thank you for asking me.",
        "I am a backend engineer with six years of experience.",
        "I enjoy building reliable systems for real customers.",
        "I would use a queue to decouple the two services.",
        "Indexes on the foreign keys fixed the slow report.",
        "I profiled first and then removed the extra allocations.",
        "I would agree on scope with the team and cut features.",
        "I rebuilt the billing pipeline and cut failures by half.",
        "We talked it through and agreed on shared code owners.",
        "How large is the team I would be joining, roughly?",
    ];

    fn engine_with(generator: Generator, follow_up_probability: f64) -> ConversationEngine {
        let planner = QuestionPlanner::new(
            generator.clone(),
            Embedder::offline(),
            CandidateProfile::default(),
            GroundingSources::default(),
            None,
        );
        ConversationEngine::new(
            planner,
            Utterances::new(generator),
            StdRng::seed_from_u64(42),
            follow_up_probability,
        )
    }

    fn offline_engine() -> ConversationEngine {
        engine_with(Generator::disabled(), 0.0)
    }

    #[tokio::test]
    async fn test_open_sets_last_question_only() {
        let mut engine = offline_engine();
        let opening = engine.open().await;
        assert_eq!(opening, OPENING_FALLBACK);
        assert_eq!(engine.state().last_question, OPENING_FALLBACK);
        assert!(engine.state().asked.is_empty());
        assert_eq!(engine.state().turn, 0);
        assert_eq!(engine.phase(), Phase::Greeting);
    }

    #[tokio::test]
    async fn test_empty_message_is_ignored() {
        let mut engine = offline_engine();
        engine.open().await;
        let reaction = engine.handle("   ").await;
        assert!(reaction.outgoing.is_empty());
        assert!(reaction.evaluation.is_none());
        assert_eq!(engine.state().turn, 0);
        assert!(engine.state().last_user.is_empty());
    }

    #[tokio::test]
    async fn test_first_two_turns_ask_fixed_questions() {
        let mut engine = offline_engine();
        engine.open().await;

        let first = engine.handle(ANSWERS[0]).await;
        assert_eq!(engine.state().turn, 1);
        assert!(first.outgoing[0].ends_with(PERSONAL_INTRO_QUESTION));
        assert_eq!(engine.state().last_question, PERSONAL_INTRO_QUESTION);

        let second = engine.handle(ANSWERS[1]).await;
        assert_eq!(engine.state().turn, 2);
        assert!(second.outgoing[0].ends_with(MOTIVATION_QUESTION));
        assert_eq!(engine.phase(), Phase::Interviewing);
    }

    #[tokio::test]
    async fn test_confusion_does_not_advance_turn() {
        let mut engine = offline_engine();
        engine.open().await;

        for _ in 0..3 {
            let reaction = engine.handle("Sorry, what do you mean?").await;
            assert_eq!(reaction.outgoing.len(), 1);
            assert!(reaction.outgoing[0].starts_with("Let me say it a different way:"));
            assert!(reaction.evaluation.is_none());
        }
        assert_eq!(engine.state().turn, 0);
        assert_eq!(engine.state().asked.len(), 3);

        engine.handle(ANSWERS[0]).await;
        assert_eq!(engine.state().turn, 1);
    }

    #[tokio::test]
    async fn test_evaluation_job_snapshots_previous_question() {
        let mut engine = offline_engine();
        engine.open().await;
        engine.handle(ANSWERS[0]).await;

        let reaction = engine.handle(ANSWERS[1]).await;
        let job = reaction.evaluation.unwrap();
        assert_eq!(job.question, PERSONAL_INTRO_QUESTION);
        assert_eq!(job.answer, ANSWERS[1]);
    }

    #[tokio::test]
    async fn test_short_answer_skips_acknowledgement() {
        let mut engine = offline_engine();
        engine.open().await;
        let reaction = engine.handle("Fine, thanks.").await;
        assert_eq!(reaction.outgoing, vec![PERSONAL_INTRO_QUESTION.to_string()]);
    }

    #[tokio::test]
    async fn test_technical_turns_are_counted() {
        let mut engine = offline_engine();
        engine.open().await;
        for answer in &ANSWERS[..5] {
            engine.handle(answer).await;
        }
        // turns 3, 4 and 5 are technical
        assert_eq!(engine.state().turn, 5);
        assert_eq!(engine.state().tech_asked, 3);
    }

    #[tokio::test]
    async fn test_full_interview_reaches_one_transition_and_one_closing() {
        let mut engine = offline_engine();
        engine.open().await;

        let mut transitions = Vec::new();
        let mut closings = 0;
        for answer in ANSWERS {
            let reaction = engine.handle(answer).await;
            if reaction.transition == Transition::EnteredCandidateQuestions {
                transitions.push(engine.state().turn);
                assert!(reaction.outgoing[0].ends_with(CANDIDATE_QUESTION_INVITE));
            }
            closings += reaction
                .outgoing
                .iter()
                .filter(|line| line.as_str() == CLOSING_FALLBACK)
                .count();
            assert!(engine.state().in_candidate_q_phase || transitions.is_empty());
        }

        assert_eq!(transitions, vec![9]);
        assert_eq!(closings, 1);
        assert_eq!(engine.phase(), Phase::Closed);
        assert!(engine.handle("Are you still there?").await.outgoing.is_empty());
    }

    #[tokio::test]
    async fn test_candidate_phase_survives_confusion() {
        let mut engine = offline_engine();
        engine.open().await;
        for answer in &ANSWERS[..9] {
            engine.handle(answer).await;
        }
        assert!(engine.state().in_candidate_q_phase);

        engine.handle("I don't understand, can you rephrase?").await;
        assert!(engine.state().in_candidate_q_phase);
        assert_eq!(engine.state().turn, 9);

        let reaction = engine.handle("I hope I did well, thank you").await;
        assert_eq!(reaction.transition, Transition::Closed);
        assert_eq!(reaction.outgoing[1], EMPATHETIC_CLOSING);
    }

    #[tokio::test]
    async fn test_certain_follow_up_does_not_advance() {
        let gateway = Arc::new(ScriptedGateway::always("Which metric told you it worked?"));
        let mut engine = engine_with(Generator::new(Some(gateway), Duration::from_secs(5)), 1.0);
        engine.open().await;
        engine.handle(ANSWERS[0]).await;
        assert_eq!(engine.state().turn, 1);

        let long_answer = "I rebuilt the billing pipeline and cut nightly failures by half.";
        let reaction = engine.handle(long_answer).await;
        assert_eq!(reaction.outgoing, vec!["Which metric told you it worked?".to_string()]);
        assert!(reaction.evaluation.is_none());
        assert_eq!(engine.state().turn, 1);
        assert_eq!(engine.state().last_question, "Which metric told you it worked?");
    }

    #[tokio::test]
    async fn test_zero_probability_never_follows_up() {
        let gateway = Arc::new(ScriptedGateway::always("Which metric told you it worked?"));
        let mut engine = engine_with(Generator::new(Some(gateway), Duration::from_secs(5)), 0.0);
        engine.open().await;
        for answer in &ANSWERS[..4] {
            engine.handle(answer).await;
        }
        assert_eq!(engine.state().turn, 4);
    }
}
