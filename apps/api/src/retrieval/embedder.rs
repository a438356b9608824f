use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::EmbeddingGateway;
use crate::retrieval::vector::text_hash;

/// Embeds text through the backend when one is configured, and falls back to
/// `text_hash` vectors on absence, error, timeout or a short reply.
#[derive(Clone)]
pub struct Embedder {
    gateway: Option<Arc<dyn EmbeddingGateway>>,
    timeout: Duration,
}

impl Embedder {
    pub fn new(gateway: Option<Arc<dyn EmbeddingGateway>>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Hash-only embedder.
    pub fn offline() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    /// One vector per input, in input order. Never fails.
    pub async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }
        let Some(gateway) = &self.gateway else {
            return hash_all(texts);
        };

        match tokio::time::timeout(self.timeout, gateway.embed(texts)).await {
            Ok(Ok(vectors)) if vectors.len() == texts.len() => vectors,
            Ok(Ok(vectors)) => {
                warn!(
                    "Embedding backend returned {} vectors for {} inputs, using hash fallback",
                    vectors.len(),
                    texts.len()
                );
                hash_all(texts)
            }
            Ok(Err(e)) => {
                warn!("Embedding backend failed, using hash fallback: {e}");
                hash_all(texts)
            }
            Err(_) => {
                warn!(
                    "Embedding backend timed out after {}s, using hash fallback",
                    self.timeout.as_secs()
                );
                hash_all(texts)
            }
        }
    }

    pub async fn embed_one(&self, text: &str) -> Vec<f32> {
        self.embed(&[text.to_string()])
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| text_hash(text))
    }
}

fn hash_all(texts: &[String]) -> Vec<Vec<f32>> {
    texts.iter().map(|t| text_hash(t)).collect()
}
