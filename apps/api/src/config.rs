use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables.
/// Only malformed numeric values fail start-up; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset → in-memory stores.
    pub database_url: Option<String>,
    /// `None` when no key is configured or `USE_MOCK=1`; the service then runs on fallback content.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub chat_model: String,
    pub eval_model: String,
    pub embedding_model: String,
    pub port: u16,
    pub rust_log: String,
    pub eval_workers: usize,
    pub follow_up_probability: f64,
    pub session_idle_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let use_mock = optional_env("USE_MOCK").as_deref() == Some("1");
        let llm_api_key = if use_mock {
            None
        } else {
            optional_env("LLM_API_KEY")
        };

        let follow_up_probability: f64 =
            parse_or("FOLLOW_UP_PROBABILITY", optional_env("FOLLOW_UP_PROBABILITY"), 0.05)?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            llm_api_key,
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            chat_model: optional_env("CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            eval_model: optional_env("EVAL_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            port: parse_or("PORT", optional_env("PORT"), 8089)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            eval_workers: parse_or("EVAL_WORKERS", optional_env("EVAL_WORKERS"), 4usize)?.max(1),
            follow_up_probability: follow_up_probability.clamp(0.0, 1.0),
            session_idle_timeout: Duration::from_secs(parse_or(
                "SESSION_IDLE_TIMEOUT_SECS",
                optional_env("SESSION_IDLE_TIMEOUT_SECS"),
                120,
            )?),
            generation_timeout: Duration::from_secs(parse_or(
                "GENERATION_TIMEOUT_SECS",
                optional_env("GENERATION_TIMEOUT_SECS"),
                30,
            )?),
        })
    }

    /// True when a generation/embedding backend is configured.
    pub fn backend_enabled(&self) -> bool {
        self.llm_api_key.is_some()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
