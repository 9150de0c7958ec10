//! Availability-gated chat facade
//!
//! Builds the full answer path from configuration. A deployment without
//! provider keys or a provisioned index is a supported state: every
//! question gets the fixed unavailable message instead of an error page.

use std::sync::Arc;

use scribe_common::config::AiConfig;
use scribe_common::credentials::CredentialPool;
use scribe_common::embeddings::EmbeddingClient;
use scribe_common::generation::GeminiGenerator;
use scribe_common::index::PineconeIndex;

use crate::composer::{AnswerComposer, AskRequest, UNAVAILABLE_MESSAGE};
use crate::retrieval::RetrievalEngine;

pub struct ChatService {
    inner: Option<AnswerComposer>,
}

impl ChatService {
    /// Wire the production components from configuration and environment
    /// credentials. Missing configuration yields a degraded (but working)
    /// service rather than an error.
    pub fn from_config(config: &AiConfig) -> Self {
        let Some(pool) = CredentialPool::from_env("GEMINI_API_KEY") else {
            tracing::warn!("no provider credentials; chat disabled");
            return Self::unavailable();
        };

        let index = match PineconeIndex::from_config(&config.index) {
            Ok(index) => Arc::new(index),
            Err(e) => {
                tracing::warn!(error = %e, "vector index unavailable; chat disabled");
                return Self::unavailable();
            }
        };

        let pool = Arc::new(pool);
        let embedder = Arc::new(EmbeddingClient::gemini(pool.clone(), &config.embedding));
        let generator = Arc::new(GeminiGenerator::new(pool, &config.generation));
        let retrieval = RetrievalEngine::new(embedder, index, &config.retrieval);

        Self::new(AnswerComposer::new(retrieval, generator))
    }

    /// Wrap an already-assembled composer (tests, custom wiring)
    pub fn new(composer: AnswerComposer) -> Self {
        Self {
            inner: Some(composer),
        }
    }

    /// A service that answers everything with the unavailable message
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    /// Answer a reader's question. Never fails; degraded deployments get
    /// the fixed unavailable copy.
    pub async fn ask(&self, request: &AskRequest<'_>) -> String {
        match &self.inner {
            Some(composer) => composer.answer(request).await,
            None => {
                metrics::counter!("scribe_chat_fallbacks_total").increment(1);
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_service_answers_with_fixed_copy() {
        let service = ChatService::unavailable();
        assert!(!service.is_available());

        let answer = service
            .ask(&AskRequest {
                query: "How much do widgets cost?",
                ..AskRequest::default()
            })
            .await;
        assert_eq!(answer, UNAVAILABLE_MESSAGE);
    }
}
