use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::data::{GraphNode, GraphRelationship, Metadata, NodeId, Record};
use crate::traits::{GraphStore, NodeHit, PathNode, PathRelationship, PathRow};

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<GraphNode>,
    relationships: Vec<GraphRelationship>,
    next_id: i64,
}

/// A fake implementation of GraphStore for testing.
///
/// Nodes and relationships live in memory. The typed operations behave like
/// the real store; `execute` returns no rows.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct InMemoryGraphStore {
    state: Arc<Mutex<GraphState>>,
    connected: bool,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GraphState::default())),
            connected: true,
        }
    }

    /// A store that reports itself disconnected and ignores every call.
    pub fn unavailable() -> Self {
        Self {
            connected: false,
            ..Self::new()
        }
    }

    pub fn nodes(&self) -> Vec<GraphNode> {
        self.state.lock().nodes.clone()
    }

    pub fn relationships(&self) -> Vec<GraphRelationship> {
        self.state.lock().relationships.clone()
    }

    fn to_record(properties: &Metadata) -> Record {
        properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    fn path_node(node: &GraphNode) -> PathNode {
        PathNode {
            id: node.id,
            labels: vec![node.label.clone()],
            props: Self::to_record(&node.properties),
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn execute(&self, _statement: &str, _parameters: Record) -> Vec<Record> {
        Vec::new()
    }

    async fn create_node(&self, label: &str, properties: Metadata) -> Option<NodeId> {
        if !self.connected {
            return None;
        }

        let mut state = self.state.lock();
        state.next_id += 1;
        let id = NodeId(state.next_id);
        state.nodes.push(GraphNode {
            id,
            label: label.to_string(),
            properties,
        });
        Some(id)
    }

    async fn create_relationship(
        &self,
        from: NodeId,
        to: NodeId,
        rel_type: &str,
        properties: Metadata,
    ) -> Vec<Record> {
        if !self.connected {
            return Vec::new();
        }

        let mut state = self.state.lock();
        let exists = |id: NodeId| state.nodes.iter().any(|n| n.id == id);
        if !exists(from) || !exists(to) {
            return Vec::new();
        }

        state.relationships.push(GraphRelationship {
            from,
            to,
            rel_type: rel_type.to_string(),
            properties,
        });

        let mut record = Record::new();
        record.insert("rel_type".to_string(), Value::String(rel_type.to_string()));
        vec![record]
    }

    async fn search_nodes(&self, keyword: &str, limit: usize) -> Vec<NodeHit> {
        if !self.connected {
            return Vec::new();
        }

        let needle = keyword.to_lowercase();
        let state = self.state.lock();
        state
            .nodes
            .iter()
            .filter(|node| {
                node.properties
                    .values()
                    .any(|value| value.to_lowercase().contains(&needle))
            })
            .take(limit)
            .map(|node| NodeHit {
                node_id: node.id,
                labels: vec![node.label.clone()],
                properties: Self::to_record(&node.properties),
            })
            .collect()
    }

    /// Breadth-first expansion over relationships in either direction; a
    /// relationship appears at most once per path.
    async fn get_neighborhood(&self, node_id: NodeId, depth: usize, limit: usize) -> Vec<PathRow> {
        if !self.connected {
            return Vec::new();
        }

        let state = self.state.lock();
        let find = |id: NodeId| state.nodes.iter().find(|n| n.id == id);
        if find(node_id).is_none() {
            return Vec::new();
        }

        let mut rows = Vec::new();
        let mut queue: VecDeque<(Vec<NodeId>, Vec<usize>)> = VecDeque::new();
        queue.push_back((vec![node_id], Vec::new()));

        while let Some((nodes, rels)) = queue.pop_front() {
            if !rels.is_empty() {
                rows.push(PathRow {
                    relationships: rels
                        .iter()
                        .map(|&i| PathRelationship {
                            rel_type: state.relationships[i].rel_type.clone(),
                            props: Self::to_record(&state.relationships[i].properties),
                        })
                        .collect(),
                    nodes: nodes.iter().filter_map(|&id| find(id)).map(Self::path_node).collect(),
                });
                if rows.len() >= limit {
                    break;
                }
            }

            if rels.len() >= depth.max(1) {
                continue;
            }

            let Some(&last) = nodes.last() else { continue };
            for (i, rel) in state.relationships.iter().enumerate() {
                if rels.contains(&i) {
                    continue;
                }
                let next = if rel.from == last {
                    rel.to
                } else if rel.to == last {
                    rel.from
                } else {
                    continue;
                };

                let mut next_nodes = nodes.clone();
                next_nodes.push(next);
                let mut next_rels = rels.clone();
                next_rels.push(i);
                queue.push_back((next_nodes, next_rels));
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Metadata {
        let mut props = Metadata::new();
        props.insert("name".to_string(), name.to_string());
        props
    }

    #[tokio::test]
    async fn test_relationship_requires_existing_endpoints() {
        let store = InMemoryGraphStore::new();
        let a = store.create_node("Product", named("A")).await.unwrap();

        assert!(store.create_relationship(a, NodeId(99), "USES", Metadata::new()).await.is_empty());
        assert!(store.relationships().is_empty());
    }

    #[tokio::test]
    async fn test_neighborhood_respects_depth() {
        let store = InMemoryGraphStore::new();
        let a = store.create_node("N", named("A")).await.unwrap();
        let b = store.create_node("N", named("B")).await.unwrap();
        let c = store.create_node("N", named("C")).await.unwrap();
        store.create_relationship(a, b, "NEXT", Metadata::new()).await;
        store.create_relationship(b, c, "NEXT", Metadata::new()).await;

        assert_eq!(store.get_neighborhood(a, 1, 50).await.len(), 1);

        let rows = store.get_neighborhood(a, 2, 50).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].nodes.last().map(|n| n.id), Some(c));

        // Incoming relationships are followed too.
        assert_eq!(store.get_neighborhood(c, 1, 50).await.len(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = InMemoryGraphStore::new();
        store.create_node("Product", named("Solar Panel X")).await;

        assert_eq!(store.search_nodes("PANEL", 5).await.len(), 1);
        assert!(store.search_nodes("battery", 5).await.is_empty());
    }
}
