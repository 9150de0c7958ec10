//! Similarity retrieval and context assembly
//!
//! Embeds the question with the query task type (providers optimize query
//! and document embeddings differently), pulls the nearest chunks, and
//! flattens them into one context string, most similar first.

use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use scribe_common::config::RetrievalConfig;
use scribe_common::embeddings::{Embedder, EmbeddingTask};
use scribe_common::errors::Result;
use scribe_common::index::{DocumentFilter, ScoredRecord, VectorIndex};

/// Separator between chunks in the assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Retrieval output. An empty context is a valid state, not an error;
/// the composer decides the fallback.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub context: String,
    pub matches: Vec<ScoredRecord>,
}

pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k: config.top_k,
        }
    }

    /// Retrieve context for a question, optionally scoped to one document.
    #[instrument(skip(self, query), fields(scope = scope.unwrap_or("")))]
    pub async fn retrieve(&self, query: &str, scope: Option<&str>) -> Result<Retrieval> {
        let start = Instant::now();
        metrics::counter!("scribe_retrieval_queries_total").increment(1);

        let vector = self.embedder.embed(query, EmbeddingTask::Query).await?;

        let filter = scope.map(DocumentFilter::new);
        let matches = self
            .index
            .query(&vector, self.top_k, filter.as_ref())
            .await?;

        let context = assemble_context(&matches);

        metrics::histogram!("scribe_retrieval_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::debug!(
            matches = matches.len(),
            context_len = context.len(),
            "retrieval complete"
        );

        Ok(Retrieval { context, matches })
    }
}

/// Concatenate match texts, most similar first, each prefixed with its
/// source title when one is stored. Matches without text are skipped.
fn assemble_context(matches: &[ScoredRecord]) -> String {
    let parts: Vec<String> = matches
        .iter()
        .filter_map(|m| {
            let metadata = m.metadata.as_ref()?;
            if metadata.text.is_empty() {
                return None;
            }
            if metadata.title.is_empty() {
                Some(metadata.text.clone())
            } else {
                Some(format!("From '{}':\n{}", metadata.title, metadata.text))
            }
        })
        .collect();

    parts.join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_common::index::ChunkMetadata;

    fn hit(title: &str, text: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            id: "doc_0".into(),
            score,
            metadata: Some(ChunkMetadata::new("doc", title, "slug", text, 0, 1).unwrap()),
        }
    }

    #[test]
    fn test_context_prefixes_titles_and_separates() {
        let matches = vec![
            hit("Widgets 101", "Widgets cost $5.", 0.9),
            hit("", "Untitled chunk text.", 0.8),
        ];
        let context = assemble_context(&matches);
        assert_eq!(
            context,
            "From 'Widgets 101':\nWidgets cost $5.\n\n---\n\nUntitled chunk text."
        );
    }

    #[test]
    fn test_textless_matches_are_skipped() {
        let matches = vec![
            ScoredRecord {
                id: "a_0".into(),
                score: 0.9,
                metadata: None,
            },
            hit("Widgets 101", "", 0.8),
        ];
        assert_eq!(assemble_context(&matches), "");
    }

    #[test]
    fn test_no_matches_yield_empty_context() {
        assert_eq!(assemble_context(&[]), "");
    }
}
