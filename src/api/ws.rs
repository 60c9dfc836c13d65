//! WebSocket chat endpoint.
//!
//! Protocol: the client sends `{message, session_id?}` frames; the server
//! answers each with a typing indicator followed by either an
//! `agent_response` (chat) or a `command_result` (`//` input). Errors go out
//! as `error` envelopes. A frame that is not valid JSON closes the
//! connection; everything else keeps it open.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tracing::{debug, info, warn};

use crate::api::protocol::{ClientMessage, ServerMessage};
use crate::api::server::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!("Failed to serialize outbound frame: {}", e);
            false
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("WebSocket client connected");

    // Memory key for clients that never send a session_id: unique per
    // connection so anonymous tabs don't share history.
    let fallback_session = format!("web:{}", uuid::Uuid::new_v4());

    while let Some(Ok(frame)) = socket.recv().await {
        let text = match frame {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        let parsed: ClientMessage = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(e) => {
                warn!("Malformed WebSocket frame: {}", e);
                let _ = send(
                    &mut socket,
                    &ServerMessage::Error {
                        message: format!("Invalid JSON: {}", e),
                    },
                )
                .await;
                break;
            }
        };

        if parsed.message.is_empty() {
            send(
                &mut socket,
                &ServerMessage::Error {
                    message: "Message is required".to_string(),
                },
            )
            .await;
            continue;
        }

        let session_id = parsed.session_id.as_deref().unwrap_or(&fallback_session);
        debug!("WS turn: session={} len={}", session_id, parsed.message.len());

        let agent_name = {
            let shell = state.shell.lock().await;
            shell.config.name.clone()
        };
        if !send(&mut socket, &ServerMessage::AgentTyping { agent_name }).await {
            break;
        }

        let reply = handle_turn(&state, &parsed.message, session_id).await;
        if !send(&mut socket, &reply).await {
            break;
        }
    }

    info!("WebSocket client disconnected");
}

/// Run one turn and build the response envelope.
async fn handle_turn(state: &AppState, message: &str, session_id: &str) -> ServerMessage {
    if message.starts_with("//") {
        let command_str = message[2..].trim().to_string();
        let mut shell = state.shell.lock().await;
        match shell.dispatch(message).await {
            Ok(result) => ServerMessage::CommandResult {
                command: command_str,
                result,
                ansi: true,
                cwd: std::env::current_dir()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "?".to_string()),
            },
            Err(e) => ServerMessage::Error {
                message: format!("Command error: {}", e),
            },
        }
    } else {
        let shell = state.shell.lock().await;
        match shell.chat(message, session_id).await {
            Ok(content) => ServerMessage::AgentResponse {
                content,
                ansi: true,
            },
            Err(e) => {
                warn!("Chat turn failed: {:#}", e);
                ServerMessage::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::shell::AgentShell;
    use crate::config::schema::Config;
    use crate::providers::LLMProvider;
    use crate::session::SessionStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::sync::Mutex;

    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(
            &self,
            messages: &[Value],
            _model: &str,
            _temperature: f64,
            _max_tokens: u32,
        ) -> Result<String> {
            let last = messages.last().unwrap();
            Ok(format!("echo: {}", last["content"].as_str().unwrap()))
        }

        fn default_model(&self) -> &str {
            "echo"
        }
    }

    fn test_state(dir: &std::path::Path) -> AppState {
        let shell = AgentShell::new(
            Config::default(),
            Some(dir.join("config.json")),
            Arc::new(EchoProvider),
            SessionStore::new(dir.join("sessions")),
        );
        AppState {
            shell: Arc::new(Mutex::new(shell)),
        }
    }

    #[tokio::test]
    async fn test_status_turn_produces_command_result_with_model() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = handle_turn(&state, "//status", "default").await;
        match reply {
            ServerMessage::CommandResult {
                command, result, ansi, ..
            } => {
                assert_eq!(command, "status");
                assert!(ansi);
                let model = state.shell.lock().await.config.model_name.clone();
                assert!(result.contains(&model));
            }
            other => panic!("expected command_result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_command_turn_is_error_envelope() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = handle_turn(&state, "//frobnicate", "default").await;
        match reply {
            ServerMessage::Error { message } => {
                assert!(message.contains("frobnicate"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_turn_is_agent_response() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = handle_turn(&state, "hello there", "web:1").await;
        match reply {
            ServerMessage::AgentResponse { content, ansi } => {
                assert_eq!(content, "echo: hello there");
                assert!(ansi);
            }
            other => panic!("expected agent_response, got {:?}", other),
        }
    }
}
