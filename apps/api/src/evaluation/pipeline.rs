//! EvaluationPipeline: scores one completed turn and persists the result.
//! EvaluationPool: bounded background workers the session loop hands turns to.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};
use uuid::Uuid;

use crate::evaluation::evaluator::Evaluator;
use crate::interview::engine::EvaluationJob;
use crate::models::evaluation::EvaluationResult;
use crate::store::{EvaluationStore, KnowledgeStore};

/// Domain articles included as evaluation context.
const CONTEXT_ARTICLES: usize = 6;

pub struct EvaluationPipeline {
    evaluator: Evaluator,
    evaluations: Arc<dyn EvaluationStore>,
    knowledge: Arc<dyn KnowledgeStore>,
}

impl EvaluationPipeline {
    pub fn new(
        evaluator: Evaluator,
        evaluations: Arc<dyn EvaluationStore>,
        knowledge: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            evaluator,
            evaluations,
            knowledge,
        }
    }

    /// Up to six domain articles joined by blank lines. Empty when unavailable.
    pub async fn domain_context(&self, domain: Option<&str>) -> String {
        let Some(domain) = domain.filter(|d| !d.trim().is_empty()) else {
            return String::new();
        };
        match self.knowledge.kb_articles(domain, CONTEXT_ARTICLES).await {
            Ok(items) => items
                .into_iter()
                .map(|item| item.text)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => {
                warn!("Failed to load evaluation context for '{domain}': {e:#}");
                String::new()
            }
        }
    }

    /// Scores and stores one turn. A failed save is logged and not retried.
    pub async fn run(
        &self,
        session_id: Uuid,
        domain: Option<&str>,
        job: &EvaluationJob,
    ) -> EvaluationResult {
        let context = self.domain_context(domain).await;
        let result = self
            .evaluator
            .evaluate(&job.question, &job.answer, &context)
            .await;

        if let Err(e) = self
            .evaluations
            .save_evaluation(session_id, &job.question, &job.answer, &result)
            .await
        {
            warn!("Failed to store evaluation for session {session_id}: {e:#}");
        }

        info!(
            "Evaluated turn for session {}: overall {:.1} (tech {:.1}, comm {:.1}, conf {:.1})",
            session_id,
            result.overall,
            result.technical_score,
            result.communication_score,
            result.confidence_score
        );
        result
    }
}

/// Runs evaluations off the conversation path with bounded concurrency.
/// Dispatch never waits for a free worker; the spawned task does.
#[derive(Clone)]
pub struct EvaluationPool {
    pipeline: Arc<EvaluationPipeline>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl EvaluationPool {
    pub fn new(pipeline: Arc<EvaluationPipeline>, workers: usize) -> Self {
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    pub fn dispatch(
        &self,
        session_id: Uuid,
        domain: Option<String>,
        job: EvaluationJob,
    ) -> JoinHandle<Option<EvaluationResult>> {
        let pipeline = self.pipeline.clone();
        let permits = self.permits.clone();
        self.tracker.spawn(async move {
            // closed only if the semaphore is dropped, which the pool never does
            let _permit = permits.acquire_owned().await.ok()?;
            Some(pipeline.run(session_id, domain.as_deref(), &job).await)
        })
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stops accepting new work and waits for every dispatched evaluation.
    pub async fn shutdown(&self) {
        self.tracker.close();
        info!("Waiting for {} in-flight evaluations", self.in_flight());
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Generator;
    use crate::retrieval::vector::RetrievedItem;
    use crate::store::MemoryStore;
    use crate::test_support::ScriptedGateway;
    use std::time::Duration;

    fn job(question: &str, answer: &str) -> EvaluationJob {
        EvaluationJob {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    fn offline_pipeline(store: Arc<MemoryStore>) -> Arc<EvaluationPipeline> {
        Arc::new(EvaluationPipeline::new(
            Evaluator::new(Generator::disabled()),
            store.clone(),
            store,
        ))
    }

    #[tokio::test]
    async fn test_run_persists_result() {
        let store = Arc::new(MemoryStore::new());
        let session = Uuid::new_v4();
        let result = offline_pipeline(store.clone())
            .run(session, None, &job("Why Rust?", "Because of the borrow checker."))
            .await;

        assert_eq!(store.load_evaluations(session).await.unwrap(), vec![result]);
        assert_eq!(
            store.evaluated_pairs(session).await,
            vec![("Why Rust?".to_string(), "Because of the borrow checker.".to_string())]
        );
    }

    #[tokio::test]
    async fn test_domain_context_joins_articles() {
        let store = Arc::new(MemoryStore::new());
        let articles = (0..8)
            .map(|i| RetrievedItem::new(format!("article {i}"), vec![1.0]))
            .collect();
        store.add_kb_articles("backend", articles).await.unwrap();

        let pipeline = offline_pipeline(store);
        let context = pipeline.domain_context(Some("backend")).await;
        assert_eq!(context.split("\n\n").count(), 6);
        assert!(pipeline.domain_context(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_context_reaches_rubric_prompt() {
        let store = Arc::new(MemoryStore::new());
        store
            .add_kb_articles("backend", vec![RetrievedItem::new("Idempotent retries", vec![1.0])])
            .await
            .unwrap();
        let gateway = Arc::new(ScriptedGateway::new([r#"{"overall": 90}"#]));
        let pipeline = EvaluationPipeline::new(
            Evaluator::new(Generator::new(Some(gateway.clone()), Duration::from_secs(5))),
            store.clone(),
            store,
        );

        let result = pipeline
            .run(Uuid::new_v4(), Some("backend"), &job("Q", "A"))
            .await;
        assert_eq!(result.overall, 90.0);
        assert!(gateway.prompts()[0].1.contains("Idempotent retries"));
    }

    #[tokio::test]
    async fn test_pool_runs_and_shuts_down() {
        let store = Arc::new(MemoryStore::new());
        let pool = EvaluationPool::new(offline_pipeline(store.clone()), 2);
        let session = Uuid::new_v4();

        let handles: Vec<_> = (0..5)
            .map(|i| pool.dispatch(session, None, job("Q", &format!("answer number {i}"))))
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        pool.shutdown().await;
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(store.load_evaluations(session).await.unwrap().len(), 5);
    }
}
