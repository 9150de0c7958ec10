//! Vector index adapter
//!
//! Provides the storage abstraction for embedded chunks:
//! - [`VectorIndex`] - upsert / delete-by-filter / similarity query
//! - [`PineconeIndex`] - REST adapter for the external index service
//! - [`MemoryIndex`] - in-memory double for tests and local development
//!
//! Record identity is `{document_id}_{chunk_index}`, which makes re-upserts
//! idempotent and lets a whole document be replaced deterministically.

mod memory;
mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{AiError, Result};

/// Fixed metadata schema stored with every vector record.
///
/// Validated at construction; duck-typed maps never reach the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning document identifier (stable string from the CMS)
    pub document_id: String,

    /// Document title at ingestion time
    pub title: String,

    /// Slug or other source reference
    pub source: String,

    /// The chunk text itself, returned verbatim at query time
    pub text: String,

    /// Position of this chunk within its document
    pub chunk_index: usize,

    /// Chunk count for the document at ingestion time
    pub total_chunks: usize,
}

impl ChunkMetadata {
    pub fn new(
        document_id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
        chunk_index: usize,
        total_chunks: usize,
    ) -> Result<Self> {
        let document_id = document_id.into();
        if document_id.trim().is_empty() {
            return Err(AiError::InvalidMetadata {
                message: "document_id must not be empty".to_string(),
            });
        }
        if chunk_index >= total_chunks {
            return Err(AiError::InvalidMetadata {
                message: format!(
                    "chunk_index {} out of range for {} chunks",
                    chunk_index, total_chunks
                ),
            });
        }

        Ok(Self {
            document_id,
            title: title.into(),
            source: source.into(),
            text: text.into(),
            chunk_index,
            total_chunks,
        })
    }
}

/// A vector with its stored metadata, as sent to the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl VectorRecord {
    /// Deterministic record identity; re-ingesting a document overwrites
    /// the same ids instead of accumulating.
    pub fn record_id(document_id: &str, chunk_index: usize) -> String {
        format!("{}_{}", document_id, chunk_index)
    }

    pub fn new(values: Vec<f32>, metadata: ChunkMetadata) -> Self {
        let id = Self::record_id(&metadata.document_id, metadata.chunk_index);
        Self {
            id,
            values,
            metadata,
        }
    }
}

/// Metadata criteria for delete and scoped query. Every filter in this
/// pipeline is document-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    pub document_id: String,
}

impl DocumentFilter {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }
}

/// A query hit, most similar first
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub metadata: Option<ChunkMetadata>,
}

/// Trait over the external vector index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records by id. Batches above the adapter's
    /// batch size are split into sequential calls; earlier batches are
    /// not rolled back when a later one fails.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Remove all records matching the filter. A store-side "not found"
    /// is treated as success.
    async fn delete_by_filter(&self, filter: &DocumentFilter) -> Result<()>;

    /// Nearest-neighbour query, optionally scoped by filter. Returns at
    /// most `top_k` records ordered by descending similarity.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<ScoredRecord>>;
}
