//! GraphStore trait definition for knowledge graph interaction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{Metadata, NodeId, Record};

/// A node matched by a keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHit {
    pub node_id: NodeId,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Node properties, returned under the `n` column.
    #[serde(rename = "n", default)]
    pub properties: Record,
}

impl NodeHit {
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).and_then(value_as_text)
    }
}

/// A relationship as seen from a traversal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRelationship {
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub props: Record,
}

/// A node as seen from a traversal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: NodeId,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub props: Record,
}

/// One row of a neighborhood expansion: the relationships and nodes of a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathRow {
    #[serde(default)]
    pub relationships: Vec<PathRelationship>,
    #[serde(default)]
    pub nodes: Vec<PathNode>,
}

/// Renders a JSON property value as display text; `null` yields nothing.
pub fn value_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Interface to the knowledge graph store.
///
/// Every operation degrades to an empty result instead of failing: callers
/// cannot distinguish "no results" from "store down", and must not need to.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// True while a transport to the store is established.
    fn is_connected(&self) -> bool;

    /// Runs a statement with parameters and returns the result rows.
    async fn execute(&self, statement: &str, parameters: Record) -> Vec<Record>;

    /// Creates a node and returns the store-assigned id.
    async fn create_node(&self, label: &str, properties: Metadata) -> Option<NodeId>;

    /// Links two existing nodes. Empty when either endpoint does not exist.
    async fn create_relationship(
        &self,
        from: NodeId,
        to: NodeId,
        rel_type: &str,
        properties: Metadata,
    ) -> Vec<Record>;

    /// Finds nodes having any property that contains `keyword`.
    async fn search_nodes(&self, keyword: &str, limit: usize) -> Vec<NodeHit>;

    /// Expands paths of up to `depth` hops in either direction from a node.
    async fn get_neighborhood(&self, node_id: NodeId, depth: usize, limit: usize) -> Vec<PathRow>;
}
