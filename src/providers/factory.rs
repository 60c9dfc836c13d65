//! Provider construction from configuration.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::errors::ProviderError;
use crate::providers::base::LLMProvider;
use crate::providers::openai_compat::OpenAICompatProvider;

/// Base URL, API key env var, and fallback model for a known provider name.
fn provider_profile(name: &str) -> Option<(&'static str, Option<&'static str>, &'static str)> {
    match name {
        "groq" => Some((
            "https://api.groq.com/openai/v1",
            Some("GROQ_API_KEY"),
            "openai/gpt-oss-120b",
        )),
        "openai" => Some(("https://api.openai.com/v1", Some("OPENAI_API_KEY"), "gpt-4o-mini")),
        "openrouter" => Some((
            "https://openrouter.ai/api/v1",
            Some("OPENROUTER_API_KEY"),
            "openai/gpt-oss-120b",
        )),
        // Local server, no key required.
        "ollama" => Some(("http://localhost:11434/v1", None, "qwen3:4b")),
        _ => None,
    }
}

/// Names accepted by [`create_provider`].
pub fn known_providers() -> &'static [&'static str] {
    &["groq", "openai", "openrouter", "ollama"]
}

/// Build the provider named in the config.
///
/// Fails fast when the name is unknown or the key env var is unset, so a
/// misconfiguration surfaces at startup instead of on the first chat turn.
pub fn create_provider(name: &str) -> Result<Arc<dyn LLMProvider>> {
    let Some((api_base, key_env, default_model)) = provider_profile(name) else {
        bail!(
            "Unknown provider '{}'. Supported: {}",
            name,
            known_providers().join(", ")
        );
    };

    let api_key = match key_env {
        Some(env_var) => match std::env::var(env_var) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => return Err(ProviderError::MissingApiKey(name.to_string()).into()),
        },
        None => None,
    };

    Ok(Arc::new(OpenAICompatProvider::new(
        api_base,
        api_key,
        default_model,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let err = create_provider("nonsense").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("nonsense"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let provider = create_provider("ollama").unwrap();
        assert_eq!(provider.default_model(), "qwen3:4b");
    }

    #[test]
    fn test_missing_key_classified() {
        std::env::remove_var("OPENROUTER_API_KEY");
        let err = create_provider("openrouter").map(|_| ()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::MissingApiKey(_))
        ));
    }
}
