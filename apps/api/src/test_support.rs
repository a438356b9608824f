//! Test doubles shared by the unit tests: scripted backends, an in-memory
//! transport, and an offline `AppState`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::evaluation::{EvaluationPipeline, EvaluationPool, Evaluator, SessionAggregator};
use crate::interview::profile::LlmProfileExtractor;
use crate::interview::session::Transport;
use crate::llm_client::{EmbeddingGateway, GenerationGateway, Generator, LlmError};
use crate::retrieval::embedder::Embedder;
use crate::state::AppState;
use crate::store::MemoryStore;

/// Replies from a queue, in order. Errors once the queue is empty unless a
/// repeating reply was configured. Records every (system, user) prompt.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.as_ref().to_string()).collect()),
            repeat: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns `reply` for every call.
    pub fn always(reply: &str) -> Self {
        Self {
            repeat: Some(reply.to_string()),
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        let next = self.replies.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            })
    }
}

/// Every call fails.
pub struct FailingGateway;

#[async_trait]
impl GenerationGateway for FailingGateway {
    async fn complete(&self, _: &str, _: &str, _: f32, _: u32) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingGateway for FailingGateway {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::RateLimited { retries: 3 })
    }
}

/// Sleeps before answering; pair with a paused clock.
pub struct SlowGateway(pub Duration);

#[async_trait]
impl GenerationGateway for SlowGateway {
    async fn complete(&self, _: &str, _: &str, _: f32, _: u32) -> Result<String, LlmError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }
}

/// Same vector for every input.
pub struct FixedEmbeddingGateway(pub Vec<f32>);

#[async_trait]
impl EmbeddingGateway for FixedEmbeddingGateway {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|_| self.0.clone()).collect())
    }
}

/// Feeds scripted candidate messages, then reports the channel closed.
pub struct ScriptedTransport {
    incoming: VecDeque<String>,
    pub sent: Vec<String>,
    pub closed: bool,
}

impl ScriptedTransport {
    pub fn new<I>(messages: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            incoming: messages.into_iter().map(|m| m.as_ref().to_string()).collect(),
            sent: Vec::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.sent.push(text);
        Ok(())
    }

    async fn receive(&mut self) -> Option<String> {
        self.incoming.pop_front()
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        llm_api_key: None,
        llm_base_url: "http://localhost:0".to_string(),
        chat_model: "test-chat".to_string(),
        eval_model: "test-eval".to_string(),
        embedding_model: "test-embed".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        eval_workers: 2,
        follow_up_probability: 0.0,
        session_idle_timeout: Duration::from_secs(5),
        generation_timeout: Duration::from_secs(5),
    }
}

/// Offline state over one shared `MemoryStore`, which is returned for inspection.
pub fn test_state_with_memory() -> (AppState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let config = test_config();
    let chat = Generator::disabled();

    let pipeline = Arc::new(EvaluationPipeline::new(
        Evaluator::new(chat.clone()),
        memory.clone(),
        memory.clone(),
    ));
    let state = AppState {
        eval_pool: EvaluationPool::new(pipeline.clone(), config.eval_workers),
        aggregator: SessionAggregator::new(memory.clone(), memory.clone()),
        profile_extractor: Arc::new(LlmProfileExtractor::new(chat.clone())),
        knowledge: memory.clone(),
        embedder: Embedder::offline(),
        pipeline,
        chat,
        config,
    };
    (state, memory)
}

pub fn test_state() -> AppState {
    test_state_with_memory().0
}
