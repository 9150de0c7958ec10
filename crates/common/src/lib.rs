//! Scribe Common Library
//!
//! Shared code for the Scribe AI pipeline including:
//! - Error taxonomy for every provider boundary
//! - Configuration management
//! - Credential pool with rate-limit rotation
//! - Embedding and generation clients
//! - Vector index adapter
//! - Metrics and tracing setup

pub mod config;
pub mod credentials;
pub mod embeddings;
pub mod errors;
pub mod generation;
pub mod index;
pub mod metrics;
pub mod telemetry;

// Re-export commonly used types
pub use config::AiConfig;
pub use credentials::CredentialPool;
pub use embeddings::{Embedder, EmbeddingTask};
pub use errors::{AiError, Result};
pub use generation::Generator;
pub use index::VectorIndex;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/gemini-embedding-001";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "models/gemini-2.0-flash";
