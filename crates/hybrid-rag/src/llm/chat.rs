use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::LlmConfig;
use crate::data::CoreError;
use crate::traits::TextCompletion;

/// Chat completion against any OpenAI-compatible endpoint.
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.api_base.clone());

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }
}

fn generation_error(error: impl std::fmt::Display) -> CoreError {
    CoreError::Generation(error.to_string())
}

#[async_trait]
impl TextCompletion for OpenAiChat {
    #[instrument(skip(self, system_prompt, user_query), fields(model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_query: &str) -> Result<String, CoreError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(generation_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_query)
                .build()
                .map_err(generation_error)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.0)
            .messages(messages)
            .build()
            .map_err(generation_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(generation_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CoreError::Generation("Empty completion response".to_string()))?;

        debug!("Completion returned {} characters", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotenv::dotenv;
    use std::env;

    #[tokio::test]
    async fn test_complete_against_live_endpoint() {
        dotenv().ok();
        let api_key = match env::var("LLM_API_KEY").or_else(|_| env::var("GROQ_API_KEY")) {
            Ok(key) => key,
            Err(_) => {
                eprintln!("Skipping test: LLM_API_KEY not set");
                return;
            }
        };

        let chat = OpenAiChat::new(&LlmConfig {
            api_key,
            model: crate::config::DEFAULT_LLM_MODEL.to_string(),
            api_base: crate::config::DEFAULT_LLM_API_BASE.to_string(),
        });

        match chat.complete("Answer with one word.", "What color is the sky?").await {
            Ok(answer) => assert!(!answer.is_empty()),
            Err(err) => eprintln!("LLM API error: {}", err),
        }
    }
}
