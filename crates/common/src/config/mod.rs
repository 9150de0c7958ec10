//! Configuration management for the Scribe AI pipeline
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/<env>, config/local)
//! - Default values
//!
//! Provider credentials are not part of this tree; they are scanned from
//! numbered environment variables by [`crate::credentials::CredentialPool`].

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generative model configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Chunking parameters
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Fixed delay inserted before every embedding call, in milliseconds.
    /// Global pacing against provider throughput limits, not per-key.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Index endpoint host, e.g. "https://blog-chunks-abc123.svc.pinecone.io".
    /// Absent means the index was never provisioned and AI features are
    /// disabled.
    pub host: Option<String>,

    /// Index API key
    pub api_key: Option<String>,

    /// Maximum vectors per upsert call; larger batches are split
    #[serde(default = "default_upsert_batch")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Window size in bytes of normalized text
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, measured from the realized
    /// chunk end
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Nearest neighbours fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

// Default value functions
fn default_embedding_model() -> String { crate::DEFAULT_EMBEDDING_MODEL.to_string() }
fn default_chat_model() -> String { crate::DEFAULT_CHAT_MODEL.to_string() }
fn default_api_base() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_pacing_ms() -> u64 { 1000 }
fn default_provider_timeout() -> u64 { 30 }
fn default_generation_timeout() -> u64 { 60 }
fn default_upsert_batch() -> usize { 100 }
fn default_chunk_size() -> usize { 1500 }
fn default_chunk_overlap() -> usize { 200 }
fn default_top_k() -> usize { 5 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            api_base: default_api_base(),
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            api_base: default_api_base(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            batch_size: default_upsert_batch(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            index: IndexConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AiConfig {
    /// Load configuration from environment and files.
    ///
    /// Reads `.env` first so deployments can keep everything in one file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__INDEX__HOST=https://...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the embedding pacing delay as a Duration
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.embedding.pacing_ms)
    }

    /// Whether the vector index side of the pipeline is configured
    pub fn index_configured(&self) -> bool {
        self.index.host.is_some() && self.index.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AiConfig::default();
        assert_eq!(config.embedding.model, "models/gemini-embedding-001");
        assert_eq!(config.chunking.chunk_size, 1500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.index.batch_size, 100);
    }

    #[test]
    fn test_index_unconfigured_by_default() {
        let config = AiConfig::default();
        assert!(!config.index_configured());
    }

    #[test]
    fn test_pacing_delay() {
        let config = AiConfig::default();
        assert_eq!(config.pacing_delay(), Duration::from_millis(1000));
    }
}
