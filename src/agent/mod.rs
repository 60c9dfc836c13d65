//! The conversation loop: prompt assembly, provider call, memory writeback.

pub mod toolbox;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::schema::Config;
use crate::providers::LLMProvider;
use crate::session::SessionStore;

/// A borrowed view over the pieces needed to run one chat turn.
///
/// Constructed fresh per call so config changes made by commands (model
/// switch, prompt edit) take effect on the next turn without any
/// synchronization.
pub struct AgentHandle<'a> {
    pub provider: &'a dyn LLMProvider,
    pub config: &'a Config,
    pub sessions: &'a SessionStore,
}

impl AgentHandle<'_> {
    /// Run one conversation turn for `session_id` and return the reply.
    ///
    /// Prompt order: system prompt, then the memory window, then the new
    /// user message. When memory is disabled, each turn is independent and
    /// nothing is persisted.
    pub async fn chat(&self, message: &str, session_id: &str) -> Result<String> {
        let mut messages: Vec<Value> = vec![json!({
            "role": "system",
            "content": self.config.system_prompt,
        })];

        if self.config.enable_memory {
            messages.extend(
                self.sessions
                    .get_history(session_id, self.config.memory.max_messages)
                    .await,
            );
        }

        messages.push(json!({ "role": "user", "content": message }));
        debug!(
            "chat turn: session={} context_messages={}",
            session_id,
            messages.len()
        );

        let model = if self.config.model_name.is_empty() {
            self.provider.default_model()
        } else {
            self.config.model_name.as_str()
        };

        let reply = self
            .provider
            .chat(
                &messages,
                model,
                self.config.temperature,
                self.config.max_tokens,
            )
            .await?;

        if self.config.enable_memory {
            self.sessions.add_turn(session_id, message, &reply).await;
        }

        Ok(reply)
    }
}
