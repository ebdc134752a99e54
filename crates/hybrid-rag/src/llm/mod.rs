//! Language model collaborators: answer generation and entity extraction

#[cfg(feature = "openai")]
mod chat;
mod extractor;

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::data::CoreError;
use crate::traits::TextCompletion;

#[cfg(feature = "openai")]
pub use chat::OpenAiChat;
pub use extractor::LlmEntityExtractor;

/// Create the chat completion service from the provided configuration
pub fn create_completion(config: &LlmConfig) -> Result<Arc<dyn TextCompletion>, CoreError> {
    #[cfg(feature = "openai")]
    {
        Ok(Arc::new(OpenAiChat::new(config)))
    }
    #[cfg(not(feature = "openai"))]
    {
        let _ = config;
        Err(CoreError::Configuration(
            "Answer generation requires the 'openai' feature".to_string(),
        ))
    }
}
