//! Document ingestion pipeline
//!
//! Orchestrates normalize -> chunk -> embed -> replace for one document.
//! Embedding runs one chunk at a time; sequential on purpose, the provider
//! throughput limit is the bottleneck, not CPU. A chunk whose embedding
//! fails is skipped and reported, and re-ingesting a document always fully
//! supersedes its previous records.

use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use scribe_common::config::ChunkingConfig;
use scribe_common::embeddings::{Embedder, EmbeddingTask};
use scribe_common::errors::{AiError, Result};
use scribe_common::index::{ChunkMetadata, DocumentFilter, VectorIndex, VectorRecord};

use crate::chunker::Chunker;
use crate::normalizer::normalize;

/// A published article as handed over by the CMS
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Stable identifier
    pub id: String,
    /// Title at publication time
    pub title: String,
    /// Raw content, may contain markup
    pub content: String,
    /// Slug or other source reference
    pub source: String,
}

/// Outcome of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document_id: String,
    /// Chunks embedded and stored
    pub chunks_processed: usize,
    /// Chunks produced by the chunker
    pub total_chunks: usize,
    /// Indices of chunks dropped because their embedding failed
    pub failed_chunks: Vec<usize>,
}

/// Per-document result within a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub document_id: String,
    pub outcome: Result<IngestReport>,
}

pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunker: Chunker,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunking: ChunkingConfig,
    ) -> Result<Self> {
        Ok(Self {
            embedder,
            index,
            chunker: Chunker::new(chunking)?,
        })
    }

    /// Ingest one published document, replacing any records stored for it.
    ///
    /// The delete-then-upsert pair is not transactional: a concurrent
    /// reader can observe a transient window with no vectors for this
    /// document. When every chunk fails to embed the store is left
    /// untouched, so a failed re-ingest keeps serving the previous
    /// content instead of nothing.
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn ingest(&self, document: &SourceDocument) -> Result<IngestReport> {
        let start = Instant::now();
        metrics::counter!("scribe_ingest_documents_total").increment(1);

        if document.id.trim().is_empty() {
            return Err(AiError::InvalidMetadata {
                message: "document id must not be empty".to_string(),
            });
        }

        let text = normalize(&document.content);
        let chunks: Vec<&str> = self.chunker.chunks(&text).map(|c| c.text).collect();
        let total_chunks = chunks.len();
        tracing::info!(chunk_count = total_chunks, "document chunked");

        let mut records = Vec::with_capacity(total_chunks);
        let mut failed_chunks = Vec::new();

        for (chunk_index, chunk) in chunks.iter().enumerate() {
            match self.embedder.embed(chunk, EmbeddingTask::Document).await {
                Ok(values) => {
                    let metadata = ChunkMetadata::new(
                        &document.id,
                        &document.title,
                        &document.source,
                        *chunk,
                        chunk_index,
                        total_chunks,
                    )?;
                    records.push(VectorRecord::new(values, metadata));
                }
                Err(e) => {
                    tracing::warn!(chunk_index, error = %e, "embedding failed, skipping chunk");
                    metrics::counter!("scribe_ingest_chunk_failures_total").increment(1);
                    failed_chunks.push(chunk_index);
                }
            }
        }

        if records.is_empty() {
            return Err(AiError::NothingEmbedded {
                document_id: document.id.clone(),
            });
        }

        // Best-effort: a failed delete leaves stale records behind, which
        // the deterministic ids largely overwrite anyway.
        if let Err(e) = self
            .index
            .delete_by_filter(&DocumentFilter::new(&document.id))
            .await
        {
            tracing::warn!(error = %e, "failed to clear previous records, continuing");
        }

        self.index.upsert(&records).await?;

        metrics::counter!("scribe_ingest_chunks_total").increment(records.len() as u64);
        metrics::histogram!("scribe_ingest_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            chunks_processed = records.len(),
            failed = failed_chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "document ingested"
        );

        Ok(IngestReport {
            document_id: document.id.clone(),
            chunks_processed: records.len(),
            total_chunks,
            failed_chunks,
        })
    }

    /// Ingest a batch; one failing document never aborts the rest.
    pub async fn ingest_all(&self, documents: &[SourceDocument]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            let outcome = self.ingest(document).await;
            if let Err(e) = &outcome {
                tracing::error!(document_id = %document.id, error = %e, "ingestion failed");
            }
            outcomes.push(BatchOutcome {
                document_id: document.id.clone(),
                outcome,
            });
        }
        outcomes
    }

    /// Remove every record for a document (unpublish / delete hook).
    #[instrument(skip(self))]
    pub async fn remove(&self, document_id: &str) -> Result<()> {
        self.index
            .delete_by_filter(&DocumentFilter::new(document_id))
            .await
    }

    /// Operator-triggered repair: unconditional delete, then a fresh
    /// ingest. Unlike [`ingest`](Self::ingest), a document that fails to
    /// embed ends up with no records at all.
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn reindex(&self, document: &SourceDocument) -> Result<IngestReport> {
        self.remove(&document.id).await?;
        self.ingest(document).await
    }
}
