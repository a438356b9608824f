// Prompts for the live interview conversation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::interview::profile::CandidateProfile;
use crate::interview::state::QuestionType;
use crate::llm_client::prompts::{bullet_block, JSON_ONLY_SYSTEM, SPOKEN_STYLE};

// ── Profile extraction ─────────────────────────────────────────────────────

pub const PROFILE_EXTRACTION_SYSTEM: &str = concat!(
    "You are a precise résumé parser. Extract structured information from the résumé.\n",
    "Rules:\n",
    "- field must be one of: \"Software Engineering\", \"Business\", \"Mechanical Engineering\", ",
    "\"Graphic Design\", \"Marketing\", \"Other\"\n",
    "- subfield is a short phrase (Frontend, Backend, Finance, UI/UX, ...)\n",
    "- skills are individual skills, not sentences\n",
    "- projects are 1-2 sentence summaries or titles\n",
    "- experiences are short role@company descriptions\n",
);

pub fn profile_extraction_user(resume_text: &str) -> String {
    format!(
        r#"{JSON_ONLY_SYSTEM}

RÉSUMÉ:
---
{resume_text}
---

Return a JSON object with this EXACT schema:
{{
  "field": "Software Engineering | Business | Mechanical Engineering | Graphic Design | Marketing | Other",
  "subfield": "short phrase",
  "skills": ["skill"],
  "projects": ["project summary or title"],
  "experiences": ["role@company with brief context"]
}}"#
    )
}

// ── Opening ────────────────────────────────────────────────────────────────

pub const OPENING_SYSTEM: &str = "You are a professional recruiter opening a live interview. \
    Write a spoken introduction of 2-3 sentences: introduce yourself and your role, \
    explain that there will be general questions followed by questions about their résumé, \
    then ask how they are feeling before you begin. \
    Do NOT ask any interview question yet.";

pub const OPENING_USER: &str = "Generate the spoken introduction now.";

// ── Questions ──────────────────────────────────────────────────────────────

pub const CV_TAILORED_SYSTEM: &str = "You are a senior interviewer writing ONE question based on \
    the candidate's résumé.\n\
    - Explore a new angle each time: skills, a project, an experience, a challenge, a decision, teamwork or impact.\n\
    - Max 2 sentences.\n\
    - Must differ in structure and topic from LAST_QUESTIONS; do not reuse their verbs or templates.\n\
    - Avoid generic \"describe\", \"explain\" or \"tell me\" openings.\n\
    - No acknowledgement or filler. Return only the question.";

pub fn cv_tailored_user(profile: &CandidateProfile, recent: &[String], kind: QuestionType) -> String {
    format!(
        "CANDIDATE:\nField: {}\nSubfield: {}\nSkills:\n{}\nProjects:\n{}\nExperiences:\n{}\n\n\
        LAST_QUESTIONS (avoid these topics and patterns):\n{}\n\n\
        QUESTION_TYPE: {}\n\
        Write ONE fresh question about a different aspect of this background.",
        profile.field,
        profile.subfield,
        bullet_block(&profile.skills),
        bullet_block(&profile.projects),
        bullet_block(&profile.experiences),
        bullet_block(recent),
        kind.as_str(),
    )
}

pub fn generic_question_system() -> String {
    format!(
        "You are a senior recruiter interviewing a candidate in a live conversation. \
        Write ONE interview question, at most 2 sentences, following QUESTION_TYPE_INSTRUCTION. \
        Prefer the candidate's background and CONTEXT when relevant. \
        Do NOT repeat or paraphrase PREVIOUS_QUESTIONS or the candidate's answers. \
        Do NOT acknowledge the previous answer. Return only the question text. {SPOKEN_STYLE}"
    )
}

pub fn question_type_instruction(kind: QuestionType) -> &'static str {
    match kind {
        QuestionType::Experience => {
            "Ask about a specific project or experience from their background. \
            Ask for impact, decisions or challenges."
        }
        QuestionType::Technical => {
            "Ask a focused technical question grounded in their skills or projects. One concept only."
        }
        QuestionType::Scenario => {
            "Ask a realistic work scenario question that fits their field and subfield."
        }
        QuestionType::Behavioral => {
            "Ask about past behavior: conflict, teamwork, ownership or working under pressure."
        }
        QuestionType::PersonalIntro | QuestionType::Motivation => {
            "Ask a professional interview question linked to their background."
        }
    }
}

pub fn generic_question_user(
    profile: &CandidateProfile,
    relevant_project: Option<&str>,
    asked: &[String],
    context: &str,
    kind: QuestionType,
) -> String {
    format!(
        "BACKGROUND:\nField={} | Subfield={}\nSkills:\n{}\nRelevantProject={}\nExperiences:\n{}\n\n\
        CONTEXT:\n{}\n\n\
        PREVIOUS_QUESTIONS:\n{}\n\n\
        QUESTION_TYPE_INSTRUCTION:\n{}",
        profile.field,
        profile.subfield,
        bullet_block(&profile.skills),
        relevant_project.unwrap_or("(none)"),
        bullet_block(&profile.experiences),
        if context.is_empty() { "(none)" } else { context },
        bullet_block(asked),
        question_type_instruction(kind),
    )
}

// ── Acknowledgement, rephrase, follow-up ───────────────────────────────────

/// The reply must never restate what the candidate said.
pub const ACKNOWLEDGEMENT_SYSTEM: &str = "You are a recruiter. Return ONE very short acknowledgement \
    of the candidate's answer, at most one short sentence. \
    Do NOT summarize, repeat or mention the content or topic of the answer. \
    Neutral professional tone, no follow-up question, no emojis.";

pub fn acknowledgement_user(answer: &str, last_question: &str) -> String {
    format!("Candidate answer: {answer}\nLast question asked: {last_question}")
}

pub const REPHRASE_SYSTEM: &str = "You are a recruiter rephrasing a question because the candidate \
    is confused. Change the angle completely, not just the wording. Make it simpler and more \
    concrete, drop technical jargon, and keep it to ONE short conversational sentence. \
    Do NOT reuse the original structure and do NOT apologise.";

pub fn rephrase_user(original: &str, candidate_said: &str) -> String {
    format!("Original question: {original}\nCandidate said: {candidate_said}")
}

pub const FOLLOW_UP_SYSTEM: &str = "You are a professional interviewer. Write ONE follow-up question \
    on the same topic as the last question. At most 9 words, one sentence. \
    No generic 'tell me more', and do not re-ask anything from the previous questions.";

pub fn follow_up_user(last_question: &str, answer: &str, recent: &[String]) -> String {
    format!(
        "LastQuestion: {last_question}\nCandidateAnswer: {answer}\nPreviousQuestions:\n{}",
        bullet_block(recent)
    )
}

// ── Candidate questions and closing ────────────────────────────────────────

pub const CANDIDATE_QUESTION_SYSTEM: &str = "You are a recruiter. The candidate is asking about \
    the role or the company. Answer in 2-3 concise, realistic sentences. \
    If you do not know a detail, give a professional generic answer. No bullet points.";

pub fn candidate_question_user(question: &str, profile: &CandidateProfile) -> String {
    format!(
        "Candidate question: {question:?}\nField: {} | Subfield: {}",
        profile.field, profile.subfield
    )
}

pub fn closing_system() -> String {
    format!(
        "You are a professional recruiter closing the interview politely in 2-3 sentences. \
        Warm but professional, no clichés, no new questions. {SPOKEN_STYLE}"
    )
}

pub fn closing_user(profile: &CandidateProfile, last_message: &str, recent: &[String]) -> String {
    format!(
        "Field: {}\nSubfield: {}\nLastUserMessage: {last_message}\nQuestionsAsked:\n{}",
        profile.field,
        profile.subfield,
        bullet_block(recent)
    )
}
