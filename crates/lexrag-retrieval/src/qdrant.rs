// Thin Qdrant REST adapter: one named vector, one embedding model

use crate::passage::{Passage, ScoredPassage};
use crate::traits::VectorSearch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lexrag_llm::{EmbeddingClient, EmbeddingRequest};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

const TEXT_FIELD: &str = "chunk_text";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Searches one named vector of a collection with query embeddings from `embedder`.
pub struct QdrantSearch {
    http_client: reqwest::Client,
    base_url: String,
    collection: String,
    vector_name: String,
    embedder: Arc<dyn EmbeddingClient>,
    embedding_model: String,
    dimensions: Option<usize>,
}

impl QdrantSearch {
    pub fn new(
        config: &QdrantConfig,
        vector_name: impl Into<String>,
        embedder: Arc<dyn EmbeddingClient>,
        embedding_model: impl Into<String>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key).context("Invalid Qdrant API key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            vector_name: vector_name.into(),
            embedder,
            embedding_model: embedding_model.into(),
            dimensions: None,
        })
    }

    /// Truncate query embeddings (Matryoshka-style models)
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredPassage>> {
        let mut request = EmbeddingRequest::new(self.embedding_model.as_str(), query);
        if let Some(dimensions) = self.dimensions {
            request = request.with_dimensions(dimensions);
        }
        let vector = self
            .embedder
            .embed(request)
            .await
            .with_context(|| format!("Failed to embed query for {}", self.vector_name))?;

        let payload = json!({
            "query": vector,
            "using": self.vector_name,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .http_client
            .post(format!("{}/collections/{}/points/query", self.base_url, self.collection))
            .json(&payload)
            .send()
            .await
            .context("Failed to reach Qdrant")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Qdrant query error ({}): {}", status, error_text);
        }

        let body: QueryResponse = response.json().await.context("Failed to parse Qdrant response")?;
        Ok(body.result.points.into_iter().map(ScoredPoint::into_hit).collect())
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: Value,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    payload: Map<String, Value>,
}

impl ScoredPoint {
    fn into_hit(mut self) -> ScoredPassage {
        let text = match self.payload.remove(TEXT_FIELD) {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        // point ids are either integers or uuid strings
        let id = match self.id {
            Value::String(s) => s,
            other => other.to_string(),
        };

        ScoredPassage {
            id,
            score: self.score,
            passage: Passage::new(text).with_metadata(self.payload),
        }
    }
}
