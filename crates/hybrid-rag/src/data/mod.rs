//! Core data structures for the hybrid retrieval core

pub mod types;
pub mod trace_context;
pub mod errors;

// Re-export all common types
pub use types::{
    Chunk, ConnectionState, Document, GraphNode, GraphRelationship, Metadata, NodeId, Origin,
    Record, Route, StoreKind, Transport,
};
pub use trace_context::TraceContext;
pub use errors::{CoreError, GraphStoreError};
