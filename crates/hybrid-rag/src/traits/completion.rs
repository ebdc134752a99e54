//! TextCompletion trait: the opaque answer-generation service

use async_trait::async_trait;

use crate::data::CoreError;

#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_query: &str) -> Result<String, CoreError>;
}
