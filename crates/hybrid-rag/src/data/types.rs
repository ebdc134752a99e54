//! Core value types shared by the router, the store connectors and the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single result row from the graph store: column name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Flat string metadata attached to documents and chunks.
pub type Metadata = HashMap<String, String>;

/// Retrieval strategy selected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Vector,
    Graph,
    Hybrid,
}

impl Route {
    /// Whether the vector index is consulted for this route.
    pub fn uses_vector(self) -> bool {
        matches!(self, Route::Vector | Route::Hybrid)
    }

    /// Whether the graph store is consulted for this route.
    pub fn uses_graph(self) -> bool {
        matches!(self, Route::Graph | Route::Hybrid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Vector => "vector",
            Route::Graph => "graph",
            Route::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backing store produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Vector,
    Graph,
}

/// Identifies a backing store in errors and timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Vector,
    Graph,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Vector => f.write_str("vector"),
            StoreKind::Graph => f.write_str("graph"),
        }
    }
}

/// A loaded source document before splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `source` metadata entry, or `unknown`.
    pub fn source(&self) -> &str {
        self.metadata.get("source").map(String::as_str).unwrap_or("unknown")
    }
}

/// A unit of retrieved (or to-be-indexed) context with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    #[serde(default)]
    pub source_metadata: Metadata,
    pub origin: Origin,
    /// Similarity score reported by the vector index, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Chunk {
    pub fn vector(text: impl Into<String>, source_metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            source_metadata,
            origin: Origin::Vector,
            score: None,
        }
    }

    pub fn graph(text: impl Into<String>, source_metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            source_metadata,
            origin: Origin::Graph,
            score: None,
        }
    }
}

/// Store-assigned identifier of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub properties: Metadata,
}

impl GraphNode {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").map(String::as_str)
    }
}

/// A typed, directed link between two existing nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Metadata,
}

/// Transport currently used to reach the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Primary,
    HttpFallback,
    Unavailable,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Primary => f.write_str("primary"),
            Transport::HttpFallback => f.write_str("http_fallback"),
            Transport::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Runtime connection state of the graph connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub transport: Transport,
    pub endpoint: String,
}

impl ConnectionState {
    pub fn unavailable(endpoint: impl Into<String>) -> Self {
        Self {
            transport: Transport::Unavailable,
            endpoint: endpoint.into(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.transport, Transport::Primary | Transport::HttpFallback)
    }
}
