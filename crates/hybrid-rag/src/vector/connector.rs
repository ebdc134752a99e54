use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::{Chunk, CoreError};
use crate::traits::{EmbeddingGenerator, VectorIndex, VectorPoint, VectorStore};

/// Owns embedding and similarity search against a vector index.
pub struct VectorStoreConnector {
    embedder: Arc<dyn EmbeddingGenerator>,
    index: Arc<dyn VectorIndex>,
    score_threshold: Option<f32>,
}

impl VectorStoreConnector {
    pub fn new(embedder: Arc<dyn EmbeddingGenerator>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            score_threshold: None,
        }
    }

    /// Results scoring below `threshold` are dropped by the index.
    pub fn with_score_threshold(mut self, threshold: Option<f32>) -> Self {
        self.score_threshold = threshold;
        self
    }
}

#[async_trait]
impl VectorStore for VectorStoreConnector {
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    async fn index(&self, chunks: &[Chunk]) -> Result<usize, CoreError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.generate_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(CoreError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorPoint {
                id: Uuid::new_v4(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.source_metadata.clone(),
            })
            .collect();

        let count = self.index.upsert(points).await?;
        debug!("Indexed {} chunks", count);
        Ok(count)
    }

    #[instrument(skip(self, query), fields(query_length = query.len(), k = k))]
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>, CoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.generate_embedding(query).await?;
        let hits = self.index.search(&vector, k, self.score_threshold).await?;
        debug!("Vector search returned {} hits", hits.len());

        Ok(hits
            .into_iter()
            .map(|hit| {
                let mut chunk = Chunk::vector(hit.text, hit.metadata);
                chunk.score = Some(hit.score);
                chunk
            })
            .collect())
    }
}
