//! EntityExtractor trait: turns documents into entities and relations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{CoreError, Document, Metadata};

/// An entity mention found in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedNode {
    /// Entity name; deduplicated case-insensitively.
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_node_type() -> String {
    "Entity".to_string()
}

/// A `(source) -[type]-> (target)` edge between entity names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRelationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// Extraction output for one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<ExtractedNode>,
    #[serde(default)]
    pub relationships: Vec<ExtractedRelationship>,
    #[serde(default)]
    pub source_metadata: Metadata,
}

/// Extraction service collaborator, typically backed by a language model.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract_graph(&self, documents: &[Document]) -> Result<Vec<GraphDocument>, CoreError>;
}
