//! Metrics registration
//!
//! Names follow `{prefix}_{subject}_{unit}` with the `scribe` prefix.
//! Values are recorded inline at call sites with `counter!` / `histogram!`;
//! this module only attaches descriptions for the exporter the host
//! process installs.

use metrics::{describe_counter, describe_histogram, Unit};

/// Metrics prefix for all Scribe metrics
pub const METRICS_PREFIX: &str = "scribe";

/// Register all metric descriptions
pub fn register_metrics() {
    // Ingestion metrics
    describe_counter!(
        format!("{}_ingest_documents_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents submitted for ingestion"
    );

    describe_counter!(
        format!("{}_ingest_chunks_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks embedded and stored"
    );

    describe_counter!(
        format!("{}_ingest_chunk_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Chunks dropped because embedding failed"
    );

    describe_histogram!(
        format!("{}_ingest_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    // Embedding metrics
    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API requests"
    );

    describe_counter!(
        format!("{}_embedding_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API errors"
    );

    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Embedding generation latency in seconds"
    );

    // Retrieval metrics
    describe_counter!(
        format!("{}_retrieval_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total similarity queries issued"
    );

    describe_histogram!(
        format!("{}_retrieval_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Retrieval latency in seconds"
    );

    // Chat metrics
    describe_counter!(
        format!("{}_chat_answers_total", METRICS_PREFIX),
        Unit::Count,
        "Total chat answers produced"
    );

    describe_counter!(
        format!("{}_chat_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Answers served from fixed fallback copy"
    );
}
