use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::data::{CoreError, Metadata};
use crate::traits::{ScoredPoint, VectorIndex, VectorPoint};

/// Configuration for the Qdrant REST client
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Base URL of the Qdrant service
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    /// Timeout for HTTP requests
    pub timeout: Duration,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "documents".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Vector index stored in a Qdrant collection, reached over its REST API
#[derive(Debug)]
pub struct QdrantIndex {
    config: QdrantConfig,
    client: Client,
    collection_ready: OnceCell<()>,
}

#[derive(Debug, Serialize)]
struct PointPayload<'a> {
    text: &'a str,
    metadata: &'a Metadata,
}

#[derive(Debug, Serialize)]
struct PointStruct<'a> {
    id: String,
    vector: &'a [f32],
    payload: PointPayload<'a>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: Vec<PointStruct<'a>>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f32>,
}

/// API response wrapper
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    #[serde(default)]
    status: Value,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Map<String, Value>>,
}

impl QdrantIndex {
    /// Creates a new QdrantIndex with the provided configuration
    pub fn new(config: QdrantConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            collection_ready: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection,
            path
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    /// Maps an HTTP error to a StoreUnavailable error
    fn map_http_error(error: reqwest::Error) -> CoreError {
        if error.is_timeout() {
            CoreError::vector_unavailable(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            CoreError::vector_unavailable(format!("Connection error: {}", error))
        } else {
            CoreError::vector_unavailable(format!("HTTP error: {}", error))
        }
    }

    async fn error_from_response(response: reqwest::Response) -> CoreError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP error: {}", status));
        CoreError::vector_unavailable(format!("Qdrant returned {}: {}", status, body))
    }

    /// Creates the collection on first write if it does not exist yet.
    async fn ensure_collection(&self, dimension: usize) -> Result<(), CoreError> {
        self.collection_ready
            .get_or_try_init(|| async {
                let response = self
                    .authorize(self.client.get(self.url("")))
                    .send()
                    .await
                    .map_err(Self::map_http_error)?;

                match response.status() {
                    status if status.is_success() => {
                        debug!("Qdrant collection '{}' already exists", self.config.collection);
                        Ok(())
                    }
                    StatusCode::NOT_FOUND => {
                        let body = json!({ "vectors": { "size": dimension, "distance": "Cosine" } });
                        let response = self
                            .authorize(self.client.put(self.url("")))
                            .json(&body)
                            .send()
                            .await
                            .map_err(Self::map_http_error)?;
                        if response.status().is_success() {
                            info!(
                                "Created Qdrant collection '{}' ({} dimensions)",
                                self.config.collection, dimension
                            );
                            Ok(())
                        } else {
                            Err(Self::error_from_response(response).await)
                        }
                    }
                    _ => Err(Self::error_from_response(response).await),
                }
            })
            .await
            .map(|_| ())
    }
}

fn payload_text(payload: &serde_json::Map<String, Value>) -> String {
    payload
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn payload_metadata(payload: &serde_json::Map<String, Value>) -> Metadata {
    payload
        .get("metadata")
        .and_then(Value::as_object)
        .map(|meta| {
            meta.iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn point_id(id: &Value) -> Uuid {
    match id {
        Value::String(s) => Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil()),
        Value::Number(n) => Uuid::from_u128(n.as_u64().unwrap_or_default() as u128),
        _ => Uuid::nil(),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    #[instrument(skip(self, points), fields(collection = %self.config.collection, count = points.len()))]
    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<usize, CoreError> {
        let Some(first) = points.first() else {
            return Ok(0);
        };
        self.ensure_collection(first.vector.len()).await?;

        let request = UpsertRequest {
            points: points
                .iter()
                .map(|p| PointStruct {
                    id: p.id.to_string(),
                    vector: &p.vector,
                    payload: PointPayload {
                        text: &p.text,
                        metadata: &p.metadata,
                    },
                })
                .collect(),
        };

        let response = self
            .authorize(self.client.put(self.url("/points?wait=true")))
            .json(&request)
            .send()
            .await
            .map_err(Self::map_http_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        debug!("Upserted {} points into Qdrant", points.len());
        Ok(points.len())
    }

    #[instrument(skip(self, vector), fields(collection = %self.config.collection, k = k))]
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, CoreError> {
        let request = SearchRequest {
            vector,
            limit: k,
            with_payload: true,
            score_threshold,
        };

        let response = self
            .authorize(self.client.post(self.url("/points/search")))
            .json(&request)
            .send()
            .await
            .map_err(Self::map_http_error)?;

        match response.status() {
            status if status.is_success() => {
                let api_response: ApiResponse<Vec<SearchHit>> = response
                    .json()
                    .await
                    .map_err(|e| CoreError::vector_unavailable(format!("Failed to parse response: {}", e)))?;
                debug!(status = %api_response.status, "Qdrant search completed");

                Ok(api_response
                    .result
                    .unwrap_or_default()
                    .into_iter()
                    .map(|hit| {
                        let payload = hit.payload.unwrap_or_default();
                        ScoredPoint {
                            id: point_id(&hit.id),
                            score: hit.score,
                            text: payload_text(&payload),
                            metadata: payload_metadata(&payload),
                        }
                    })
                    .collect())
            }
            // Nothing has been indexed yet
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(Self::error_from_response(response).await),
        }
    }
}
