//! Configuration for the hybrid retrieval core
//!
//! Values come from the process environment (after loading an optional
//! `.env` file). Missing or placeholder credentials are configuration errors
//! and halt initialization; malformed optional values are logged and the
//! default is kept.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::data::CoreError;

pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LLM_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_NEO4J_URI: &str = "neo4j://localhost:7687";

/// Connection settings for the graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStoreConfig {
    /// Whether graph retrieval and graph building are enabled at all.
    pub enabled: bool,
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Explicit HTTP base URL; derived from `uri` when absent.
    pub http_uri: Option<String>,
    /// Bound on every HTTP call and on the primary connectivity check.
    pub timeout: Duration,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            uri: DEFAULT_NEO4J_URI.to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            http_uri: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Vector index settings. No URL means an in-process index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
    pub timeout: Duration,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            qdrant_url: None,
            qdrant_api_key: None,
            collection: "documents".to_string(),
            top_k: 4,
            score_threshold: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Which embedding implementation to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EmbeddingProvider {
    /// Deterministic feature hashing; no network.
    Hash,
    OpenAI { api_key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
        }
    }
}

/// OpenAI-compatible chat endpoint used for answers and graph extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub llm: LlmConfig,
    pub graph: GraphStoreConfig,
    pub vector: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
}

impl RagConfig {
    /// Load configuration from `.env` (if present) and the environment.
    pub fn load() -> Result<Self, CoreError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("GROQ_API_KEY"))
            .ok_or_else(|| CoreError::Configuration("LLM_API_KEY (or GROQ_API_KEY) is not set".to_string()))?;
        if is_placeholder(&api_key) {
            return Err(CoreError::Configuration(
                "LLM_API_KEY still holds a placeholder value; set a real key in .env".to_string(),
            ));
        }
        let llm = LlmConfig {
            api_key,
            model: get("LLM_MODEL")
                .or_else(|| get("GROQ_MODEL"))
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_base: get("LLM_API_BASE").unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string()),
        };

        let mut graph = GraphStoreConfig::default();
        graph.enabled = parse_or(get("USE_NEO4J"), "USE_NEO4J", false, parse_bool);
        if let Some(uri) = get("NEO4J_URI") {
            graph.uri = uri;
        }
        if let Some(user) = get("NEO4J_USER").or_else(|| get("NEO4J_USERNAME")) {
            graph.username = user;
        }
        if let Some(password) = get("NEO4J_PASSWORD") {
            graph.password = password;
        }
        if let Some(database) = get("NEO4J_DATABASE") {
            graph.database = database;
        }
        graph.http_uri = get("NEO4J_HTTP_URI");
        graph.timeout = Duration::from_secs(parse_or(
            get("NEO4J_TIMEOUT_SECS"),
            "NEO4J_TIMEOUT_SECS",
            30,
            |v| v.parse().ok(),
        ));
        if graph.enabled && graph.password.is_empty() {
            return Err(CoreError::Configuration(
                "USE_NEO4J is enabled but NEO4J_PASSWORD is not set".to_string(),
            ));
        }

        let mut vector = VectorStoreConfig::default();
        vector.qdrant_url = get("QDRANT_URL");
        vector.qdrant_api_key = get("QDRANT_API_KEY");
        if let Some(collection) = get("QDRANT_COLLECTION") {
            vector.collection = collection;
        }
        vector.top_k = parse_or(get("VECTOR_TOP_K"), "VECTOR_TOP_K", vector.top_k, |v| {
            v.parse().ok().filter(|k| *k > 0)
        });
        vector.score_threshold = get("VECTOR_SCORE_THRESHOLD").and_then(|v| match v.parse() {
            Ok(threshold) => Some(threshold),
            Err(_) => {
                warn!("Invalid VECTOR_SCORE_THRESHOLD value: {}", v);
                None
            }
        });

        let mut embedding = EmbeddingConfig::default();
        match get("EMBEDDING_PROVIDER").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("hash") => {}
            Some("openai") => {
                let api_key = get("OPENAI_API_KEY").ok_or_else(|| {
                    CoreError::Configuration(
                        "EMBEDDING_PROVIDER=openai requires OPENAI_API_KEY".to_string(),
                    )
                })?;
                embedding.provider = EmbeddingProvider::OpenAI { api_key };
            }
            Some(other) => {
                return Err(CoreError::Configuration(format!(
                    "Unknown EMBEDDING_PROVIDER: {}",
                    other
                )))
            }
        }
        if let Some(model) = get("EMBEDDING_MODEL") {
            embedding.model = model;
        }
        embedding.dimensions = parse_or(
            get("EMBEDDING_DIMENSIONS"),
            "EMBEDDING_DIMENSIONS",
            embedding.dimensions,
            |v| v.parse().ok().filter(|d| *d > 0),
        );

        let mut chunking = ChunkingConfig::default();
        chunking.chunk_size = parse_or(get("CHUNK_SIZE"), "CHUNK_SIZE", chunking.chunk_size, |v| {
            v.parse().ok().filter(|s| *s > 0)
        });
        chunking.chunk_overlap =
            parse_or(get("CHUNK_OVERLAP"), "CHUNK_OVERLAP", chunking.chunk_overlap, |v| v.parse().ok());
        if chunking.chunk_overlap >= chunking.chunk_size {
            warn!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({}); using no overlap",
                chunking.chunk_overlap, chunking.chunk_size
            );
            chunking.chunk_overlap = 0;
        }

        Ok(Self {
            llm,
            graph,
            vector,
            embedding,
            chunking,
        })
    }
}

fn is_placeholder(value: &str) -> bool {
    value.to_lowercase().contains("your_")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T, P>(raw: Option<String>, key: &str, default: T, parse: P) -> T
where
    P: Fn(&str) -> Option<T>,
{
    match raw {
        None => default,
        Some(value) => parse(&value).unwrap_or_else(|| {
            warn!("Invalid {} value: {}", key, value);
            default
        }),
    }
}
