//! Base trait for LLM providers.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Common interface for chat-completion providers.
///
/// Messages use the OpenAI wire shape: JSON objects with `role` and
/// `content` fields. Errors are `anyhow::Error` wrapping a
/// [`crate::errors::ProviderError`] where the failure is classifiable.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a chat completion request and return the assistant's reply text.
    async fn chat(
        &self,
        messages: &[Value],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String>;

    /// Model used when the config does not name one.
    fn default_model(&self) -> &str;
}
