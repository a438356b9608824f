//! Capability traits for the generation backend, plus `Generator`, the
//! timeout-bounded wrapper every call site in the interview core goes through.
//!
//! `AppState` carries these as `Arc<dyn …>`; tests swap in scripted gateways.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::LlmError;

/// "Given a prompt, return text."
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

/// "Given texts, return fixed-length vectors", one per input, in input order.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// One fully-built prompt with its sampling parameters.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Short label used in logs ("ack", "rephrase", ...).
    pub purpose: &'static str,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-call deadline; capped by the generator's own ceiling.
    pub timeout: Duration,
}

impl PromptSpec {
    pub fn new(purpose: &'static str, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            purpose,
            system: system.into(),
            user: user.into(),
            temperature: 0.3,
            max_tokens: 200,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Optional backend + deadline. Never errors: failures, timeouts and empty
/// replies all come back as `None` and the caller substitutes fallback text.
#[derive(Clone)]
pub struct Generator {
    gateway: Option<Arc<dyn GenerationGateway>>,
    max_timeout: Duration,
}

impl Generator {
    pub fn new(gateway: Option<Arc<dyn GenerationGateway>>, max_timeout: Duration) -> Self {
        Self {
            gateway,
            max_timeout,
        }
    }

    /// A generator with no backend; every call yields `None`.
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    pub fn is_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    pub async fn generate(&self, prompt: &PromptSpec) -> Option<String> {
        let gateway = self.gateway.as_ref()?;
        let deadline = prompt.timeout.min(self.max_timeout);

        let call = gateway.complete(
            &prompt.system,
            &prompt.user,
            prompt.temperature,
            prompt.max_tokens,
        );

        let result = match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(deadline.as_secs())),
        };

        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!("Generation '{}' returned empty content", prompt.purpose);
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(e) => {
                warn!("Generation '{}' failed, using fallback: {e}", prompt.purpose);
                None
            }
        }
    }
}
