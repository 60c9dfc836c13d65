//! Provider for OpenAI-compatible chat completion APIs.
//!
//! Groq, OpenAI, OpenRouter, and Ollama all speak the same
//! `/chat/completions` shape; only the base URL and the API key differ.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::ProviderError;
use crate::providers::base::LLMProvider;

pub struct OpenAICompatProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    default_model: String,
}

impl OpenAICompatProvider {
    pub fn new(api_base: &str, api_key: Option<String>, default_model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            default_model: default_model.to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    async fn chat(
        &self,
        messages: &[Value],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        debug!("POST {} model={}", url, model);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            let err = match status {
                401 | 403 => ProviderError::AuthError { status, message },
                429 => ProviderError::RateLimited { status },
                s if s >= 500 => ProviderError::ServerError { status, message },
                _ => ProviderError::HttpError(format!("status {}: {}", status, message)),
            };
            return Err(err.into());
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonParseError(e.to_string()))?;

        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(content)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let p = OpenAICompatProvider::new("https://api.groq.com/openai/v1/", None, "m");
        assert_eq!(p.api_base, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_default_model() {
        let p = OpenAICompatProvider::new("http://localhost:11434/v1", None, "qwen3:4b");
        assert_eq!(p.default_model(), "qwen3:4b");
    }
}
