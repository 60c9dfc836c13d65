//! Command dispatch and the shared shell state behind every front end.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::agent::{toolbox, AgentHandle};
use crate::commands::{parse_command_line, CommandRegistry};
use crate::config::loader::save_config;
use crate::config::schema::{expand_tilde, Config};
use crate::errors::CommandError;
use crate::providers::{create_provider, LLMProvider};
use crate::session::SessionStore;
use crate::tui::{Theme, BOLD, CLEAR_SCREEN, RESET};

/// Shared agent state: the REPL, the REST handlers, and the WebSocket loop
/// all operate on one `AgentShell`.
///
/// Mutable state (config, provider, cwd) only changes inside `dispatch`, and
/// the server wraps the shell in one async mutex, so a command never observes
/// a half-applied model switch.
pub struct AgentShell {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub provider: Arc<dyn LLMProvider>,
    pub sessions: SessionStore,
    pub registry: CommandRegistry,
    pub theme: Theme,
    pub session_id: String,
}

impl AgentShell {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        provider: Arc<dyn LLMProvider>,
        sessions: SessionStore,
    ) -> Self {
        let theme = Theme::from_colors(&config.colors);
        Self {
            config,
            config_path,
            provider,
            sessions,
            registry: CommandRegistry::new(),
            theme,
            session_id: "cli:default".to_string(),
        }
    }

    /// Run one chat turn against the configured provider.
    pub async fn chat(&self, message: &str, session_id: &str) -> anyhow::Result<String> {
        let handle = AgentHandle {
            provider: self.provider.as_ref(),
            config: &self.config,
            sessions: &self.sessions,
        };
        handle.chat(message, session_id).await
    }

    /// Dispatch a `//command` line and return its output text.
    ///
    /// Output may embed ANSI sequences; transports that want plain text strip
    /// them. Unknown commands and handler failures come back as
    /// [`CommandError`], never a panic.
    pub async fn dispatch(&mut self, line: &str) -> Result<String, CommandError> {
        let Some((name, args)) = parse_command_line(line) else {
            return Err(CommandError::UnknownCommand(line.trim().to_string()));
        };
        if !self.registry.contains(name) {
            return Err(CommandError::UnknownCommand(name.to_string()));
        }

        match name {
            "help" => self.cmd_help(&args),
            "tools" => Ok(self.cmd_tools()),
            "status" => Ok(self.cmd_status().await),
            "config" => self.cmd_config(),
            "system_prompt" => Ok(self.cmd_system_prompt(&args)),
            "model" => self.cmd_model(&args),
            "memory" => self.cmd_memory(&args).await,
            "rag" => Ok(self.cmd_rag(&args)),
            "clear" => Ok(CLEAR_SCREEN.to_string()),
            "cd" => self.cmd_cd(&args),
            "pwd" => self.cmd_pwd(),
            "list" => self.cmd_list(&args),
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }

    fn cwd_display(&self) -> String {
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "?".to_string())
    }

    fn cmd_help(&self, args: &[&str]) -> Result<String, CommandError> {
        if let Some(topic) = args.first() {
            let name = topic.trim_start_matches('/');
            let spec = self.registry.get(name).ok_or_else(|| {
                CommandError::failed("help", format!("no such command '{}'", name))
            })?;
            return Ok(format!(
                "{}{}{}{}\n  {}\n  Usage: {}",
                self.theme.primary, BOLD, spec.name, RESET, spec.description, spec.usage
            ));
        }

        let mut out = format!("{}{}Available commands:{}\n", self.theme.primary, BOLD, RESET);
        for spec in self.registry.specs() {
            out.push_str(&format!(
                "  {}{:<32}{} {}\n",
                self.theme.accent, spec.usage, RESET, spec.description
            ));
        }
        out.push_str(&self.theme.dim("Type anything else to chat with the agent."));
        Ok(out)
    }

    fn cmd_tools(&self) -> String {
        let mut out = format!("{}{}Toolboxes:{}\n", self.theme.primary, BOLD, RESET);
        for name in &self.config.toolboxes {
            match toolbox::tools_for(name) {
                Some(tools) => {
                    out.push_str(&format!("  {}{}{}\n", self.theme.info, name, RESET));
                    for tool in tools {
                        out.push_str(&format!("    - {}\n", tool));
                    }
                }
                None => {
                    out.push_str(&self.theme.warn(&format!("  unknown toolbox '{}'\n", name)));
                }
            }
        }
        if self.config.toolboxes.is_empty() {
            out.push_str(&self.theme.dim("  (none configured)"));
        }
        out
    }

    async fn cmd_status(&self) -> String {
        let tool_count: usize = self
            .config
            .toolboxes
            .iter()
            .filter_map(|t| toolbox::tools_for(t))
            .map(|t| t.len())
            .sum();
        let messages = self.sessions.message_count(&self.session_id).await;
        let flag = |b: bool| if b { "ON" } else { "OFF" };
        format!(
            "{}{}{} status{}\n  Provider: {}\n  Model: {}\n  Directory: {}\n  Memory: {} ({} messages)\n  RAG: {}\n  Shell: {}\n  Tools: {}\n  Commands: {}",
            self.theme.primary,
            BOLD,
            self.config.name,
            RESET,
            self.config.provider,
            self.config.model_name,
            self.cwd_display(),
            flag(self.config.enable_memory),
            messages,
            flag(self.config.enable_rag),
            flag(self.config.enable_shell),
            tool_count,
            self.registry.len(),
        )
    }

    fn cmd_config(&self) -> Result<String, CommandError> {
        serde_json::to_string_pretty(&self.config).map_err(|e| CommandError::failed("config", e))
    }

    fn cmd_system_prompt(&mut self, args: &[&str]) -> String {
        if args.is_empty() {
            return format!("System prompt:\n{}", self.config.system_prompt);
        }
        self.config.system_prompt = args.join(" ");
        save_config(&self.config, self.config_path.as_deref());
        info!("System prompt updated");
        self.theme.ok("System prompt updated and saved.")
    }

    fn cmd_model(&mut self, args: &[&str]) -> Result<String, CommandError> {
        match args {
            [] => Ok(format!(
                "Current model: {} ({})",
                self.config.model_name, self.config.provider
            )),
            [model] => {
                self.config.model_name = model.to_string();
                save_config(&self.config, self.config_path.as_deref());
                info!("Model switched to {}", model);
                Ok(self.theme.ok(&format!("Model set to {}.", model)))
            }
            [provider, model, ..] => {
                let new_provider =
                    create_provider(provider).map_err(|e| CommandError::failed("model", e))?;
                self.provider = new_provider;
                self.config.provider = provider.to_string();
                self.config.model_name = model.to_string();
                save_config(&self.config, self.config_path.as_deref());
                info!("Provider switched to {} / {}", provider, model);
                Ok(self
                    .theme
                    .ok(&format!("Switched to {} with model {}.", provider, model)))
            }
        }
    }

    async fn cmd_memory(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let sub = args.first().copied().unwrap_or("status");
        match sub {
            "status" => {
                let count = self.sessions.message_count(&self.session_id).await;
                Ok(format!(
                    "Memory: {} | {} messages in session '{}' (window {})",
                    if self.config.enable_memory { "ON" } else { "OFF" },
                    count,
                    self.session_id,
                    self.config.memory.max_messages,
                ))
            }
            "show" => {
                let history = self
                    .sessions
                    .get_history(&self.session_id, self.config.memory.max_messages)
                    .await;
                if history.is_empty() {
                    return Ok(self.theme.dim("No messages in memory."));
                }
                let mut out = String::new();
                for msg in &history {
                    let role = msg.get("role").and_then(Value::as_str).unwrap_or("?");
                    let content = msg.get("content").and_then(Value::as_str).unwrap_or("");
                    out.push_str(&format!("[{}] {}\n", role, content));
                }
                Ok(out.trim_end().to_string())
            }
            "clear" => {
                self.sessions.clear(&self.session_id).await;
                Ok(self.theme.ok("Conversation memory cleared."))
            }
            other => Err(CommandError::failed(
                "memory",
                format!("unknown subcommand '{}'; use status, show, or clear", other),
            )),
        }
    }

    fn cmd_rag(&self, args: &[&str]) -> String {
        if !self.config.enable_rag {
            return self
                .theme
                .warn("RAG is disabled. Enable 'enable_rag' in the config to use it.");
        }
        match args {
            [] | ["status"] => "RAG: ON | knowledge base managed by the retrieval backend".to_string(),
            ["search", query @ ..] if !query.is_empty() => format!(
                "Knowledge base search for '{}' is delegated to the retrieval backend.",
                query.join(" ")
            ),
            _ => "Usage: //rag [status|search <query>]".to_string(),
        }
    }

    fn cmd_cd(&self, args: &[&str]) -> Result<String, CommandError> {
        let target = match args.first() {
            Some(p) => expand_tilde(p),
            None => dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        };
        std::env::set_current_dir(&target).map_err(|e| {
            CommandError::failed("cd", format!("{}: {}", target.display(), e))
        })?;
        Ok(format!("Changed directory to {}", self.cwd_display()))
    }

    fn cmd_pwd(&self) -> Result<String, CommandError> {
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .map_err(|e| CommandError::failed("pwd", e))
    }

    fn cmd_list(&self, args: &[&str]) -> Result<String, CommandError> {
        let dir = match args.first() {
            Some(p) => expand_tilde(p),
            None => std::env::current_dir().map_err(|e| CommandError::failed("list", e))?,
        };
        let entries =
            std::fs::read_dir(&dir).map_err(|e| {
                CommandError::failed("list", format!("{}: {}", dir.display(), e))
            })?;

        let mut names: Vec<String> = Vec::new();
        for entry in entries.flatten() {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            return Ok(self.theme.dim("(empty directory)"));
        }
        Ok(format!("{}\n{}", dir.display(), names.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;
    use tempfile::tempdir;

    struct StubProvider;

    #[async_trait]
    impl LLMProvider for StubProvider {
        async fn chat(
            &self,
            _messages: &[Value],
            _model: &str,
            _temperature: f64,
            _max_tokens: u32,
        ) -> Result<String> {
            Ok("stub reply".to_string())
        }

        fn default_model(&self) -> &str {
            "stub"
        }
    }

    fn test_shell(dir: &std::path::Path) -> AgentShell {
        let config = Config::default();
        let config_path = dir.join("config.json");
        AgentShell::new(
            config,
            Some(config_path),
            Arc::new(StubProvider),
            SessionStore::new(dir.join("sessions")),
        )
    }

    #[tokio::test]
    async fn test_unknown_command_error_contains_token() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let err = shell.dispatch("//frobnicate").await.unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[tokio::test]
    async fn test_status_includes_model_name() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let out = shell.dispatch("//status").await.unwrap();
        assert!(out.contains(&shell.config.model_name));
        assert!(out.contains(&shell.config.provider));
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let out = shell.dispatch("//help").await.unwrap();
        for name in shell.registry.names() {
            assert!(out.contains(name), "help output missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_help_for_single_command() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let out = shell.dispatch("//help cd").await.unwrap();
        assert!(out.contains("//cd <path>"));
        assert!(out.contains("Change the working directory"));

        let err = shell.dispatch("//help bogus").await.unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[tokio::test]
    async fn test_unknown_toolbox_is_flagged_as_warning() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        shell.config.toolboxes.push("astrology".to_string());
        let out = shell.dispatch("//tools").await.unwrap();
        assert!(out.contains("unknown toolbox 'astrology'"));
        assert!(out.contains(&shell.theme.warning));
    }

    #[tokio::test]
    async fn test_system_prompt_update_persists() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        shell
            .dispatch("//system_prompt You are a terse reviewer.")
            .await
            .unwrap();
        assert_eq!(shell.config.system_prompt, "You are a terse reviewer.");

        let saved = crate::config::loader::load_config(shell.config_path.as_deref());
        assert_eq!(saved.system_prompt, "You are a terse reviewer.");
    }

    #[tokio::test]
    async fn test_model_single_arg_sets_model() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        shell.dispatch("//model llama-3.3-70b").await.unwrap();
        assert_eq!(shell.config.model_name, "llama-3.3-70b");
    }

    #[tokio::test]
    async fn test_model_switch_to_unknown_provider_fails() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let err = shell.dispatch("//model nonsense some-model").await.unwrap_err();
        assert!(err.to_string().contains("model"));
        // Config untouched on failure.
        assert_eq!(shell.config.provider, "groq");
    }

    #[tokio::test]
    async fn test_memory_clear_and_status() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        shell
            .sessions
            .add_turn(&shell.session_id, "q", "a")
            .await;
        let status = shell.dispatch("//memory status").await.unwrap();
        assert!(status.contains("2 messages"));

        shell.dispatch("//memory clear").await.unwrap();
        let status = shell.dispatch("//memory status").await.unwrap();
        assert!(status.contains("0 messages"));
    }

    #[tokio::test]
    async fn test_clear_returns_clear_screen() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        assert_eq!(shell.dispatch("//clear").await.unwrap(), CLEAR_SCREEN);
    }

    #[tokio::test]
    async fn test_config_is_valid_json() {
        let dir = tempdir().unwrap();
        let mut shell = test_shell(dir.path());
        let out = shell.dispatch("//config").await.unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["provider"], "groq");
    }
}
