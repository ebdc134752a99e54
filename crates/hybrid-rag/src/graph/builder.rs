use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::data::{Document, Metadata, NodeId};
use crate::graph::cypher::normalize_relationship_type;
use crate::traits::{EntityExtractor, GraphStore};

/// Upper bound on documents handed to the extractor per build.
pub const MAX_BUILD_DOCUMENTS: usize = 50;

/// Counts reported by a graph build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub entity_count: usize,
    pub relation_count: usize,
}

/// Lower-cased entity name to store id, scoped to a single build.
#[derive(Debug, Default)]
struct EntityIndex {
    ids: HashMap<String, NodeId>,
}

impl EntityIndex {
    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    fn get(&self, name: &str) -> Option<NodeId> {
        self.ids.get(&Self::key(name)).copied()
    }

    fn insert(&mut self, name: &str, id: NodeId) {
        self.ids.insert(Self::key(name), id);
    }
}

/// Populates the graph store from documents through an entity extractor.
pub struct GraphBuilder {
    store: Arc<dyn GraphStore>,
    extractor: Option<Arc<dyn EntityExtractor>>,
    max_documents: usize,
}

impl GraphBuilder {
    pub fn new(store: Arc<dyn GraphStore>, extractor: Option<Arc<dyn EntityExtractor>>) -> Self {
        Self {
            store,
            extractor,
            max_documents: MAX_BUILD_DOCUMENTS,
        }
    }

    /// Extracts entities and relationships and writes them to the store.
    ///
    /// A disconnected store, a missing extractor or a failed extraction all
    /// yield zero counts. Entities are deduplicated by lower-cased name
    /// within this call only; a second call creates fresh nodes.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn build(&self, documents: &[Document]) -> BuildStats {
        let extractor = match (&self.extractor, self.store.is_connected()) {
            (Some(extractor), true) => extractor,
            (None, _) => {
                debug!("No entity extractor configured, skipping graph build");
                return BuildStats::default();
            }
            (_, false) => {
                debug!("Graph store unavailable, skipping graph build");
                return BuildStats::default();
            }
        };

        let batch = &documents[..documents.len().min(self.max_documents)];
        if batch.len() < documents.len() {
            info!("Graph build limited to the first {} of {} documents", batch.len(), documents.len());
        }

        let graph_documents = match extractor.extract_graph(batch).await {
            Ok(graph_documents) => graph_documents,
            Err(e) => {
                warn!("Entity extraction failed: {}", e);
                return BuildStats::default();
            }
        };

        let mut index = EntityIndex::default();
        let mut stats = BuildStats::default();

        for graph_doc in &graph_documents {
            let source = graph_doc
                .source_metadata
                .get("source")
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());

            for node in &graph_doc.nodes {
                if index.get(&node.id).is_some() {
                    continue;
                }

                let mut properties = Metadata::new();
                properties.insert("name".to_string(), node.id.clone());
                properties.insert("source".to_string(), source.clone());
                if let Some(description) = &node.description {
                    properties.insert("description".to_string(), description.clone());
                }

                if let Some(id) = self.store.create_node(&node.node_type, properties).await {
                    index.insert(&node.id, id);
                    stats.entity_count += 1;
                }
            }

            for rel in &graph_doc.relationships {
                let (Some(from), Some(to)) = (index.get(&rel.source), index.get(&rel.target)) else {
                    debug!("Dropping relationship {} -> {}: unresolved endpoint", rel.source, rel.target);
                    continue;
                };

                let rel_type = normalize_relationship_type(&rel.rel_type);
                let created = self
                    .store
                    .create_relationship(from, to, &rel_type, Metadata::new())
                    .await;
                if !created.is_empty() {
                    stats.relation_count += 1;
                }
            }
        }

        info!(
            "Graph build created {} entities and {} relations",
            stats.entity_count, stats.relation_count
        );
        stats
    }
}
