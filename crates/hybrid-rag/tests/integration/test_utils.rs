use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use hybrid_rag::config::GraphStoreConfig;
use hybrid_rag::embedding::HashEmbeddingService;
use hybrid_rag::traits::{ExtractedNode, ExtractedRelationship, GraphDocument};
use hybrid_rag::vector::{InMemoryVectorIndex, VectorStoreConnector};

/// A vector store over feature-hashed embeddings held in memory.
pub fn in_memory_vector_store() -> Arc<VectorStoreConnector> {
    Arc::new(VectorStoreConnector::new(
        Arc::new(HashEmbeddingService::new(256)),
        Arc::new(InMemoryVectorIndex::new()),
    ))
}

/// Graph settings pointing at ports nothing listens on.
pub fn unreachable_graph_config() -> GraphStoreConfig {
    GraphStoreConfig {
        enabled: true,
        uri: "neo4j://127.0.0.1:9".to_string(),
        username: "neo4j".to_string(),
        password: "secret".to_string(),
        database: "neo4j".to_string(),
        http_uri: Some("http://127.0.0.1:9".to_string()),
        timeout: Duration::from_secs(2),
    }
}

pub fn node(id: &str, node_type: &str) -> ExtractedNode {
    ExtractedNode {
        id: id.to_string(),
        node_type: node_type.to_string(),
        description: None,
    }
}

pub fn relationship(source: &str, target: &str, rel_type: &str) -> ExtractedRelationship {
    ExtractedRelationship {
        source: source.to_string(),
        target: target.to_string(),
        rel_type: rel_type.to_string(),
    }
}

pub fn graph_document(nodes: Vec<ExtractedNode>, relationships: Vec<ExtractedRelationship>) -> GraphDocument {
    GraphDocument {
        nodes,
        relationships,
        ..GraphDocument::default()
    }
}

/// Writes `content` to a temporary file with the given extension.
pub fn temp_file(extension: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}
