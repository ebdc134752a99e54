#[cfg(feature = "openai")]
use async_openai::{
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client, config::OpenAIConfig,
};
#[cfg(feature = "openai")]
use async_trait::async_trait;

#[cfg(feature = "openai")]
use crate::data::CoreError;
#[cfg(feature = "openai")]
use crate::traits::EmbeddingGenerator;

#[cfg(feature = "openai")]
pub struct OpenAIEmbeddingService {
    client: Client<OpenAIConfig>,
    model: String,
}

#[cfg(feature = "openai")]
impl OpenAIEmbeddingService {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self { client, model }
    }
}

#[cfg(feature = "openai")]
#[async_trait]
impl EmbeddingGenerator for OpenAIEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()
            .map_err(|e| CoreError::Embedding(e.to_string()))?;

        let response = self.client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| CoreError::Embedding(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| CoreError::Embedding("Empty embedding response".to_string()))
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| CoreError::Embedding(e.to_string()))?;

        let response = self.client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| CoreError::Embedding(e.to_string()))?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(all(test, feature = "openai"))]
mod tests {
    use super::*;
    use dotenv::dotenv;
    use std::env;

    #[tokio::test]
    async fn test_generate_embedding() {
        dotenv().ok();
        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                eprintln!("Skipping test: OPENAI_API_KEY not set");
                return;
            }
        };

        let service = OpenAIEmbeddingService::new(api_key, "text-embedding-3-small".to_string());

        match service.generate_embedding("Hello, world!").await {
            Ok(embedding) => assert!(!embedding.is_empty()),
            Err(err) => eprintln!("OpenAI API error: {}", err),
        }
    }
}
