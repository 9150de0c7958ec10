//! Embedding generation
//!
//! Provides the embedding abstraction for the pipeline:
//! - [`Embedder`] - what the ingestion and retrieval layers consume
//! - [`GeminiProvider`] - REST adapter for the embedding endpoint
//! - [`EmbeddingClient`] - pacing + credential rotation around a provider
//! - [`HashEmbedder`] - deterministic double for tests and local runs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EmbeddingConfig;
use crate::credentials::CredentialPool;
use crate::errors::{AiError, Result};

/// Task type forwarded to the provider. Providers optimize query and
/// document embeddings differently; mixing them degrades similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    /// Embedding a user question for retrieval
    Query,
    /// Embedding stored document content
    Document,
}

impl EmbeddingTask {
    /// Wire value for the provider API
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            EmbeddingTask::Query => "RETRIEVAL_QUERY",
            EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
        }
    }
}

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;
}

/// One raw provider call with an explicit credential. Kept separate from
/// [`EmbeddingClient`] so rotation can be exercised against a scripted
/// provider in tests.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_with_key(
        &self,
        api_key: &str,
        model: &str,
        text: &str,
        task: EmbeddingTask,
    ) -> Result<Vec<f32>>;
}

/// Gemini embedding endpoint adapter
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: ContentPayload<'a>,
    #[serde(rename = "taskType")]
    task_type: &'static str,
}

#[derive(Serialize)]
struct ContentPayload<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiProvider {
    /// Create a new provider adapter
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    async fn embed_with_key(
        &self,
        api_key: &str,
        model: &str,
        text: &str,
        task: EmbeddingTask,
    ) -> Result<Vec<f32>> {
        let url = format!("{}/{}:embedContent", self.api_base, model);

        let request = EmbedRequest {
            model,
            content: ContentPayload {
                parts: vec![TextPart { text }],
            },
            task_type: task.as_provider_str(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Provider {
                message: format!("embedding request failed: {}", e),
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited { attempts: 1 });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                message: format!("embedding API error {}: {}", status, body),
            });
        }

        let result: EmbedResponse = response.json().await.map_err(|e| AiError::Provider {
            message: format!("failed to parse embedding response: {}", e),
        })?;

        if result.embedding.values.is_empty() {
            return Err(AiError::EmptyEmbedding);
        }

        Ok(result.embedding.values)
    }
}

/// Embedding client with global pacing and credential rotation.
///
/// A fixed delay is inserted before every call to respect provider
/// throughput limits; the delay is global, not per-key. On a rate-limit
/// signal the pool cursor advances circularly and the call is retried, up
/// to one attempt per key; other provider errors are never retried.
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    pool: Arc<CredentialPool>,
    model: String,
    pacing: Duration,
}

impl EmbeddingClient {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        pool: Arc<CredentialPool>,
        config: &EmbeddingConfig,
    ) -> Self {
        Self {
            provider,
            pool,
            model: config.model.clone(),
            pacing: Duration::from_millis(config.pacing_ms),
        }
    }

    /// Convenience constructor wiring the Gemini REST adapter
    pub fn gemini(pool: Arc<CredentialPool>, config: &EmbeddingConfig) -> Self {
        Self::new(Arc::new(GeminiProvider::new(config)), pool, config)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        let start = Instant::now();
        let attempts = self.pool.len();
        let mut key = self.pool.current();

        for attempt in 1..=attempts {
            metrics::counter!("scribe_embedding_requests_total").increment(1);

            match self
                .provider
                .embed_with_key(&key, &self.model, text, task)
                .await
            {
                Ok(values) => {
                    metrics::histogram!("scribe_embedding_duration_seconds")
                        .record(start.elapsed().as_secs_f64());
                    return Ok(values);
                }
                Err(e) if e.is_rate_limit() && attempt < attempts => {
                    tracing::warn!(attempt, attempts, "provider throttled, rotating key");
                    key = self.pool.rotate();
                }
                Err(e) if e.is_rate_limit() => {
                    metrics::counter!("scribe_embedding_errors_total").increment(1);
                    tracing::warn!(attempts, "all provider keys throttled");
                    return Err(AiError::RateLimited { attempts });
                }
                Err(e) => {
                    metrics::counter!("scribe_embedding_errors_total").increment(1);
                    return Err(e);
                }
            }
        }

        Err(AiError::RateLimited { attempts })
    }
}

/// Deterministic embedder for tests and index-free development.
///
/// Hashes lowercase tokens into a fixed number of buckets and normalizes,
/// so texts sharing vocabulary score high cosine similarity without any
/// network dependency.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut values = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            values[bucket] += 1.0;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in values.iter_mut() {
                *v /= norm;
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider double that throttles a fixed set of keys
    struct ScriptedProvider {
        throttled_keys: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmbeddingProvider for ScriptedProvider {
        async fn embed_with_key(
            &self,
            api_key: &str,
            _model: &str,
            _text: &str,
            _task: EmbeddingTask,
        ) -> Result<Vec<f32>> {
            self.calls.lock().unwrap().push(api_key.to_string());
            if self.throttled_keys.iter().any(|k| k == api_key) {
                Err(AiError::RateLimited { attempts: 1 })
            } else {
                Ok(vec![0.1, 0.2, 0.3])
            }
        }
    }

    fn client_with(
        throttled: &[&str],
        keys: &[&str],
    ) -> (EmbeddingClient, Arc<CredentialPool>, Arc<ScriptedProvider>) {
        let pool = Arc::new(
            CredentialPool::new(keys.iter().map(|k| k.to_string()).collect()).unwrap(),
        );
        let provider = Arc::new(ScriptedProvider {
            throttled_keys: throttled.iter().map(|k| k.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        });
        let config = EmbeddingConfig {
            pacing_ms: 0,
            ..EmbeddingConfig::default()
        };
        let client = EmbeddingClient::new(provider.clone(), pool.clone(), &config);
        (client, pool, provider)
    }

    #[tokio::test]
    async fn test_rotation_recovers_on_third_key() {
        let (client, pool, provider) =
            client_with(&["key1", "key2"], &["key1", "key2", "key3"]);

        let values = client.embed("hello", EmbeddingTask::Document).await.unwrap();
        assert_eq!(values.len(), 3);

        // One attempt per key, and the cursor stays on the key that worked
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec!["key1", "key2", "key3"]
        );
        assert_eq!(pool.position(), 2);
        assert_eq!(pool.current(), "key3");
    }

    #[tokio::test]
    async fn test_exhausted_pool_reports_rate_limit() {
        let (client, _pool, provider) = client_with(&["key1", "key2"], &["key1", "key2"]);

        let err = client.embed("hello", EmbeddingTask::Query).await.unwrap_err();
        match err {
            AiError::RateLimited { attempts } => assert_eq!(attempts, 2),
            other => panic!("expected RateLimited, got {other:?}"),
        }
        assert_eq!(provider.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried() {
        struct FailingProvider {
            calls: Mutex<usize>,
        }

        #[async_trait]
        impl EmbeddingProvider for FailingProvider {
            async fn embed_with_key(
                &self,
                _api_key: &str,
                _model: &str,
                _text: &str,
                _task: EmbeddingTask,
            ) -> Result<Vec<f32>> {
                *self.calls.lock().unwrap() += 1;
                Err(AiError::Provider {
                    message: "boom".into(),
                })
            }
        }

        let provider = Arc::new(FailingProvider {
            calls: Mutex::new(0),
        });
        let pool =
            Arc::new(CredentialPool::new(vec!["a".into(), "b".into(), "c".into()]).unwrap());
        let config = EmbeddingConfig {
            pacing_ms: 0,
            ..EmbeddingConfig::default()
        };
        let client = EmbeddingClient::new(provider.clone(), pool.clone(), &config);

        let err = client.embed("hello", EmbeddingTask::Query).await.unwrap_err();
        assert!(matches!(err, AiError::Provider { .. }));
        assert_eq!(*provider.calls.lock().unwrap(), 1);
        assert_eq!(pool.position(), 0);
    }

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(32);
        let a = embedder.embed("widgets cost money", EmbeddingTask::Document).await.unwrap();
        let b = embedder.embed("widgets cost money", EmbeddingTask::Query).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn test_hash_embedder_similarity_tracks_overlap() {
        let embedder = HashEmbedder::new(64);
        let doc = embedder.embed("Widgets cost five dollars.", EmbeddingTask::Document).await.unwrap();
        let near = embedder.embed("how much do widgets cost", EmbeddingTask::Query).await.unwrap();
        let far = embedder.embed("gardening tips for spring", EmbeddingTask::Query).await.unwrap();

        let cos = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(cos(&doc, &near) > cos(&doc, &far));
    }
}
