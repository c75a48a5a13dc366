use crate::domain::model::Prompt;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Sends a prompt to a text-generation provider and returns its raw reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String>;

    fn model(&self) -> &str;
}
