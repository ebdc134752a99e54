//! Core traits (interfaces) for the hybrid retrieval core

pub mod graph_store;
pub mod vector_store;
mod embedding_generator;
pub mod extraction;
mod completion;
mod document_loader;

pub use graph_store::{GraphStore, NodeHit, PathNode, PathRelationship, PathRow};
pub use vector_store::{ScoredPoint, VectorIndex, VectorPoint, VectorStore};
pub use embedding_generator::EmbeddingGenerator;
pub use extraction::{EntityExtractor, ExtractedNode, ExtractedRelationship, GraphDocument};
pub use completion::TextCompletion;
pub use document_loader::DocumentLoader;
