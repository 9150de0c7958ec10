//! In-memory vector index
//!
//! Cosine-similarity double used by the test suites and index-free local
//! runs. Mirrors the adapter contract including filter semantics and the
//! idempotent-by-id upsert. Tracks query calls so tests can assert that a
//! code path never touched the store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{DocumentFilter, ScoredRecord, VectorIndex, VectorRecord};
use crate::errors::Result;

#[derive(Default)]
pub struct MemoryIndex {
    records: Mutex<HashMap<String, VectorRecord>>,
    query_calls: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many similarity queries have been issued
    pub fn query_count(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the records stored for one document, in chunk order
    pub fn records_for(&self, document_id: &str) -> Vec<VectorRecord> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<VectorRecord> = records
            .values()
            .filter(|r| r.metadata.document_id == document_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.metadata.chunk_index);
        matching
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn delete_by_filter(&self, filter: &DocumentFilter) -> Result<()> {
        let mut stored = self.records.lock().unwrap();
        stored.retain(|_, r| r.metadata.document_id != filter.document_id);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<ScoredRecord>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        let stored = self.records.lock().unwrap();
        let mut scored: Vec<ScoredRecord> = stored
            .values()
            .filter(|r| match filter {
                Some(f) => r.metadata.document_id == f.document_id,
                None => true,
            })
            .map(|r| ScoredRecord {
                id: r.id.clone(),
                score: Self::cosine(vector, &r.values),
                metadata: Some(r.metadata.clone()),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkMetadata;

    fn record(document_id: &str, index: usize, total: usize, values: Vec<f32>) -> VectorRecord {
        let meta =
            ChunkMetadata::new(document_id, "Title", "slug", format!("chunk {index}"), index, total)
                .unwrap();
        VectorRecord::new(values, meta)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_id() {
        let index = MemoryIndex::new();
        index.upsert(&[record("a", 0, 1, vec![1.0, 0.0])]).await.unwrap();
        index.upsert(&[record("a", 0, 1, vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_filter_scopes_to_document() {
        let index = MemoryIndex::new();
        index
            .upsert(&[
                record("a", 0, 1, vec![1.0, 0.0]),
                record("b", 0, 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        index.delete_by_filter(&DocumentFilter::new("a")).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.records_for("b").len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_noop() {
        let index = MemoryIndex::new();
        index.delete_by_filter(&DocumentFilter::new("ghost")).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity_and_truncates() {
        let index = MemoryIndex::new();
        index
            .upsert(&[
                record("a", 0, 3, vec![1.0, 0.0]),
                record("a", 1, 3, vec![0.7, 0.7]),
                record("a", 2, 3, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a_0");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_scoped_query_ignores_other_documents() {
        let index = MemoryIndex::new();
        index
            .upsert(&[
                record("a", 0, 1, vec![1.0, 0.0]),
                record("b", 0, 1, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = index
            .query(&[1.0, 0.0], 5, Some(&DocumentFilter::new("b")))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b_0");
    }
}
