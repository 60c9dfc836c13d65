//! Domain error types for forgecli.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Errors from slash-command dispatch.
///
/// Both variants render to a human-readable message that is surfaced
/// verbatim to the caller (REPL, REST, or WebSocket). Neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Command '{0}' not found. Type //help for available commands.")]
    UnknownCommand(String),

    #[error("Error executing command '{name}': {message}")]
    Failed { name: String, message: String },
}

impl CommandError {
    /// Wrap a handler failure for the given command name.
    pub fn failed(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Failed {
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from LLM provider operations.
///
/// Embedded in `anyhow::Error` so the `LLMProvider` trait signature
/// (`-> anyhow::Result<String>`) stays unchanged while callers can
/// downcast: `e.downcast_ref::<ProviderError>()`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Failed to parse response JSON: {0}")]
    JsonParseError(String),

    #[error("Rate limited (status {status})")]
    RateLimited { status: u16 },

    #[error("Authentication failed (status {status}): {message}")]
    AuthError { status: u16, message: String },

    #[error("Server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(String),

    #[error("Empty completion in provider response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_contains_token() {
        let e = CommandError::UnknownCommand("frobnicate".into());
        assert!(e.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_failed_preserves_name_and_message() {
        let e = CommandError::failed("model", "no such provider");
        assert_eq!(
            e.to_string(),
            "Error executing command 'model': no such provider"
        );
    }

    #[test]
    fn test_provider_error_display() {
        let e = ProviderError::HttpError("connection refused".into());
        assert_eq!(e.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn test_provider_error_downcast() {
        let anyhow_err: anyhow::Error = ProviderError::AuthError {
            status: 401,
            message: "invalid key".into(),
        }
        .into();
        let downcasted = anyhow_err.downcast_ref::<ProviderError>();
        assert!(downcasted.is_some());
        assert!(matches!(
            downcasted.unwrap(),
            ProviderError::AuthError { status: 401, .. }
        ));
    }
}
