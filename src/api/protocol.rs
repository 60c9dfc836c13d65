//! Wire types shared by the REST and WebSocket frontends.
//!
//! Field names and the `type` tag values are a stable contract with the web
//! frontend; changing them breaks deployed clients.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WebSocket envelopes
// ---------------------------------------------------------------------------

/// Inbound chat frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
}

/// Outbound frames, tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AgentTyping {
        agent_name: String,
    },
    AgentResponse {
        content: String,
        ansi: bool,
    },
    CommandResult {
        command: String,
        result: String,
        ansi: bool,
        cwd: String,
    },
    Error {
        message: String,
    },
}

// ---------------------------------------------------------------------------
// REST bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub result: String,
    pub success: bool,
    pub ansi: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteRequest {
    #[serde(default)]
    pub text: String,
    pub cursor_position: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_result_roundtrip() {
        let msg = ServerMessage::CommandResult {
            command: "cd src".to_string(),
            result: "Changed directory to /work/src".to_string(),
            ansi: true,
            cwd: "/work/src".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"command_result""#));
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_tag_values_are_snake_case() {
        let json = serde_json::to_value(ServerMessage::AgentTyping {
            agent_name: "Agent".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "agent_typing");

        let json = serde_json::to_value(ServerMessage::AgentResponse {
            content: "hi".into(),
            ansi: true,
        })
        .unwrap();
        assert_eq!(json["type"], "agent_response");
    }

    #[test]
    fn test_client_message_defaults() {
        let msg: ClientMessage = serde_json::from_str(r#"{"session_id": "abc"}"#).unwrap();
        assert_eq!(msg.message, "");
        assert_eq!(msg.session_id.as_deref(), Some("abc"));
    }
}
