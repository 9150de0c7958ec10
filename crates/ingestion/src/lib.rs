//! Scribe Ingestion
//!
//! Turns published articles into vector records:
//! normalize markup -> chunk with overlap -> embed -> replace the
//! document's records in the index.

pub mod chunker;
pub mod normalizer;
pub mod pipeline;

pub use chunker::{Chunk, Chunker, Chunks};
pub use normalizer::normalize;
pub use pipeline::{BatchOutcome, IngestReport, IngestionPipeline, SourceDocument};
