//! Vector side of retrieval: the connector and its index backends

pub mod connector;
pub mod memory;
pub mod qdrant;

pub use connector::VectorStoreConnector;
pub use memory::InMemoryVectorIndex;
pub use qdrant::{QdrantConfig, QdrantIndex};
