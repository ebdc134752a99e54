//! Vector store traits: the retrieval-facing store and its index backend

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::{Chunk, CoreError, Metadata};

/// Embedding-backed similarity store consumed by the orchestrator.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embeds and upserts chunks, returning how many were indexed.
    ///
    /// Fails with `CoreError::StoreUnavailable` when the index cannot be
    /// reached; no partial retry is attempted.
    async fn index(&self, chunks: &[Chunk]) -> Result<usize, CoreError>;

    /// Returns the top-k chunks, highest similarity first.
    ///
    /// An empty index, or no result clearing the relevance threshold, yields
    /// an empty vector rather than an error.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>, CoreError>;
}

/// A point stored in a vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Metadata,
}

/// A search hit with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: Uuid,
    pub score: f32,
    pub text: String,
    pub metadata: Metadata,
}

/// Storage backend for embedded points.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces points, returning the number written.
    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<usize, CoreError>;

    /// Nearest neighbours of `vector`, best first, at most `k`.
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, CoreError>;
}
