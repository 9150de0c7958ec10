//! Error types for the Scribe AI pipeline
//!
//! Provides a closed error taxonomy with:
//! - Distinct variants for each failure mode at a provider boundary
//! - Retryability and availability classification
//!
//! User-facing copy lives in the chat layer; nothing here is ever shown
//! to an end user directly.

use thiserror::Error;

/// Result type alias using AiError
pub type Result<T> = std::result::Result<T, AiError>;

/// Pipeline error taxonomy
///
/// Every provider call is caught at the component boundary and converted
/// into one of these variants; nothing escapes as a raw transport error.
#[derive(Error, Debug)]
pub enum AiError {
    /// Required configuration was never supplied. Permanent until the
    /// process is restarted with the missing values.
    #[error("AI features not configured: {missing}")]
    NotConfigured { missing: String },

    /// The vector index was never initialized (missing host or key).
    #[error("Vector index unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Provider signalled a rate limit and every credential in the pool
    /// was exhausted.
    #[error("Provider rate limit hit after {attempts} attempts")]
    RateLimited { attempts: usize },

    /// Upstream provider failure that is not a rate limit.
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Provider answered successfully but returned no embedding values.
    #[error("Provider returned an empty embedding")]
    EmptyEmbedding,

    /// Ingestion produced zero embedded chunks; the store was left
    /// untouched.
    #[error("No chunks could be embedded for document {document_id}")]
    NothingEmbedded { document_id: String },

    /// Chunking parameters violate `0 < overlap < size`.
    #[error("Invalid chunking parameters: size={size}, overlap={overlap}")]
    InvalidChunking { size: usize, overlap: usize },

    /// Vector record metadata failed validation at construction.
    #[error("Invalid chunk metadata: {message}")]
    InvalidMetadata { message: String },

    /// Payload (de)serialization failure at a provider boundary.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AiError {
    /// Whether retrying the same call can ever succeed without operator
    /// intervention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AiError::RateLimited { .. } | AiError::Provider { .. } | AiError::EmptyEmbedding
        )
    }

    /// Whether this failure came from a provider signalling throttling.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AiError::RateLimited { .. })
    }

    /// Whether this failure means the pipeline was never configured for
    /// this deployment. The chat layer maps it to its features-disabled
    /// copy; everything else gets transient-failure copy.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AiError::NotConfigured { .. } | AiError::StoreUnavailable { .. }
        )
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Provider {
            message: err.to_string(),
        }
    }
}
