//! Hybrid retrieval-augmented question answering
//!
//! Each query is routed by keyword cues to a vector index, a knowledge graph
//! or both, and the retrieved context is handed to a chat model. Ingestion
//! feeds the same two stores from local files.

pub mod config;
pub mod data;
pub mod traits;
pub mod router;
pub mod embedding;
pub mod vector;
pub mod graph;
pub mod llm;
pub mod loader;
pub mod services;

// In-memory fakes shared by unit and integration tests
pub mod test_utils;

pub use config::RagConfig;
pub use data::{
    Chunk, ConnectionState, CoreError, Document, GraphStoreError, Metadata, Origin, Route,
    TraceContext, Transport,
};
pub use graph::{BuildStats, GraphBuilder, GraphStoreConnector};
pub use loader::TextFileLoader;
pub use router::{KeywordRouter, QueryClassifier};
pub use services::{Answer, HybridRetriever, IngestSummary, QueryMetrics, Retrieval};
pub use traits::{
    DocumentLoader, EmbeddingGenerator, EntityExtractor, GraphStore, TextCompletion, VectorIndex,
    VectorStore,
};
pub use vector::VectorStoreConnector;

/// Initialize tracing for the retrieval pipeline
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
