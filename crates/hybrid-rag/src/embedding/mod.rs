use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::data::CoreError;
use crate::traits::EmbeddingGenerator;

mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingService;

/// Deterministic bag-of-words embeddings built by feature hashing.
///
/// Texts sharing words get a positive cosine similarity, which is enough for
/// offline use and tests. No network access.
#[derive(Debug, Clone)]
pub struct HashEmbeddingService {
    embedding_dimension: usize,
}

impl HashEmbeddingService {
    pub fn new(embedding_dimension: usize) -> Self {
        Self {
            embedding_dimension: embedding_dimension.max(1),
        }
    }

    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.embedding_dimension];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let slot = (hash % self.embedding_dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[slot] += sign;
        }

        let magnitude: f32 = embedding.iter().map(|&v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashEmbeddingService {
    fn default() -> Self {
        Self::new(384)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl EmbeddingGenerator for HashEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        Ok(self.generate_deterministic_embedding(text))
    }
}

/// Create an embedding generator from the provided configuration
pub fn create_embedding_service(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingGenerator>, CoreError> {
    match &config.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbeddingService::new(config.dimensions))),
        #[cfg(feature = "openai")]
        EmbeddingProvider::OpenAI { api_key } => Ok(Arc::new(OpenAIEmbeddingService::new(
            api_key.clone(),
            config.model.clone(),
        ))),
        #[cfg(not(feature = "openai"))]
        EmbeddingProvider::OpenAI { .. } => Err(CoreError::Configuration(
            "OpenAI embeddings requested but the 'openai' feature is not enabled".to_string(),
        )),
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
