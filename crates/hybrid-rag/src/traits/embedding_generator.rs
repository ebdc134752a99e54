//! EmbeddingGenerator trait definition for vector embeddings

use async_trait::async_trait;
use crate::data::errors::CoreError;

/// Represents the interface for generating vector embeddings from text.
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Generates an embedding vector for the given text.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, CoreError>;

    /// Generates one embedding per input, in input order.
    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.generate_embedding(text).await?);
        }
        Ok(embeddings)
    }
}
