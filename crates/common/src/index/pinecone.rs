//! Pinecone REST adapter
//!
//! Talks to a serverless index over its data-plane host. Construction
//! fails fast with `StoreUnavailable` when the host or key was never
//! provisioned; the chat layer converts that into its static
//! features-disabled copy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChunkMetadata, DocumentFilter, ScoredRecord, VectorIndex, VectorRecord};
use crate::config::IndexConfig;
use crate::errors::{AiError, Result};

#[derive(Debug)]
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Serialize)]
struct DeleteRequest {
    filter: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<ChunkMetadata>,
}

impl PineconeIndex {
    /// Build the adapter from configuration. Missing host or key means
    /// the index was never provisioned for this deployment.
    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let host = config.host.clone().ok_or_else(|| AiError::StoreUnavailable {
            message: "index host not configured".to_string(),
        })?;
        let api_key = config.api_key.clone().ok_or_else(|| AiError::StoreUnavailable {
            message: "index API key not configured".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
            batch_size: config.batch_size,
        })
    }

    fn filter_value(filter: &DocumentFilter) -> serde_json::Value {
        serde_json::json!({ "document_id": { "$eq": filter.document_id } })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::Provider {
                message: format!("index request failed: {}", e),
            })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        for batch in records.chunks(self.batch_size) {
            let response = self.post("/vectors/upsert", &UpsertRequest { vectors: batch }).await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AiError::Provider {
                    message: format!("index upsert error {}: {}", status, body),
                });
            }

            tracing::debug!(batch = batch.len(), "upserted vector batch");
        }

        Ok(())
    }

    async fn delete_by_filter(&self, filter: &DocumentFilter) -> Result<()> {
        let request = DeleteRequest {
            filter: Self::filter_value(filter),
        };
        let response = self.post("/vectors/delete", &request).await?;

        // Nothing stored for this document yet; deletion already holds.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(document_id = %filter.document_id, "delete target absent, treating as no-op");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                message: format!("index delete error {}: {}", status, body),
            });
        }

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<ScoredRecord>> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            filter: filter.map(Self::filter_value),
            include_metadata: true,
        };

        let response = self.post("/query", &request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                message: format!("index query error {}: {}", status, body),
            });
        }

        let result: QueryResponse = response.json().await.map_err(|e| AiError::Provider {
            message: format!("failed to parse index query response: {}", e),
        })?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| ScoredRecord {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_host_fails_fast() {
        let config = IndexConfig {
            api_key: Some("key".into()),
            ..IndexConfig::default()
        };
        let err = PineconeIndex::from_config(&config).unwrap_err();
        assert!(matches!(err, AiError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let config = IndexConfig {
            host: Some("https://idx.example.io".into()),
            ..IndexConfig::default()
        };
        let err = PineconeIndex::from_config(&config).unwrap_err();
        assert!(matches!(err, AiError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_filter_shape() {
        let filter = DocumentFilter::new("blog-7");
        let value = PineconeIndex::filter_value(&filter);
        assert_eq!(
            value,
            serde_json::json!({ "document_id": { "$eq": "blog-7" } })
        );
    }

    #[test]
    fn test_query_request_serializes_camel_case() {
        let request = QueryRequest {
            vector: vec![0.5],
            top_k: 5,
            filter: None,
            include_metadata: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["topK"], 5);
        assert_eq!(value["includeMetadata"], true);
        assert!(value.get("filter").is_none());
    }
}
