//! Candidate profile: structured résumé facts extracted once per session.
//!
//! `AppState` holds an `Arc<dyn ProfileExtractor>`; the default
//! `LlmProfileExtractor` asks the chat model for strict JSON and degrades to
//! an empty profile on any failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interview::prompts::{profile_extraction_user, PROFILE_EXTRACTION_SYSTEM};
use crate::llm_client::{extract_json_object, Generator, PromptSpec};

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

/// Immutable after extraction. Empty when the résumé is absent or extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// One of the broad fields named in the extraction prompt, or free text.
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub subfield: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<String>,
}

impl CandidateProfile {
    /// True when there is nothing to tailor a question on.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.projects.is_empty() && self.experiences.is_empty()
    }

    fn normalized(mut self) -> Self {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        self.field = self.field.trim().to_string();
        self.subfield = self.subfield.trim().to_string();
        self.skills = clean(self.skills);
        self.projects = clean(self.projects);
        self.experiences = clean(self.experiences);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Never fails; returns an empty profile when nothing can be extracted.
    async fn extract(&self, resume_text: &str) -> CandidateProfile;
}

pub struct LlmProfileExtractor {
    generator: Generator,
}

impl LlmProfileExtractor {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract(&self, resume_text: &str) -> CandidateProfile {
        if resume_text.trim().is_empty() || !self.generator.is_enabled() {
            return CandidateProfile::default();
        }

        let prompt = PromptSpec::new(
            "profile_extraction",
            PROFILE_EXTRACTION_SYSTEM,
            profile_extraction_user(resume_text),
        )
        .temperature(0.1)
        .max_tokens(500)
        .timeout_secs(30);

        let Some(raw) = self.generator.generate(&prompt).await else {
            return CandidateProfile::default();
        };

        parse_profile(&raw).unwrap_or_else(|| {
            warn!("Profile extraction returned unparseable JSON; continuing with empty profile");
            CandidateProfile::default()
        })
    }
}

fn parse_profile(raw: &str) -> Option<CandidateProfile> {
    let json = extract_json_object(raw)?;
    let profile: CandidateProfile = serde_json::from_str(json).ok()?;
    let profile = profile.normalized();
    // a profile without a field is treated as a failed extraction
    if profile.field.is_empty() {
        None
    } else {
        Some(profile)
    }
}
