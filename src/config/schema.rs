//! Configuration schema for forgecli.
//!
//! Field names match the `agent_config.json` exported by the agent builder
//! UI, so an exported agent directory can be pointed at directly. All fields
//! carry serde defaults; a partial config file is always valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color config
// ---------------------------------------------------------------------------

/// Hex colors for CLI and API output, as exported by the builder UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_success")]
    pub success: String,
    #[serde(default = "default_error")]
    pub error: String,
    #[serde(default = "default_warning")]
    pub warning: String,
    #[serde(default = "default_info")]
    pub info: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_primary() -> String {
    "#ffffff".to_string()
}

fn default_secondary() -> String {
    "#aaaaaa".to_string()
}

fn default_success() -> String {
    "#00ff00".to_string()
}

fn default_error() -> String {
    "#ff0000".to_string()
}

fn default_warning() -> String {
    "#ffff00".to_string()
}

fn default_info() -> String {
    "#00ffff".to_string()
}

fn default_accent() -> String {
    "#ff00ff".to_string()
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            success: default_success(),
            error: default_error(),
            warning: default_warning(),
            info: default_info(),
            accent: default_accent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server config
// ---------------------------------------------------------------------------

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Frontend origins allowed by CORS, in addition to localhost dev ports.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory config
// ---------------------------------------------------------------------------

/// Conversation memory window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_max_messages() -> usize {
    20
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for an exported agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_true")]
    pub enable_shell: bool,
    #[serde(default = "default_true")]
    pub enable_memory: bool,
    #[serde(default)]
    pub enable_rag: bool,
    #[serde(default = "default_toolboxes")]
    pub toolboxes: Vec<String>,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_name() -> String {
    "Agent".to_string()
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model_name() -> String {
    "openai/gpt-oss-120b".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_true() -> bool {
    true
}

fn default_toolboxes() -> Vec<String> {
    vec!["coding".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            provider: default_provider(),
            model_name: default_model_name(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            enable_shell: true,
            enable_memory: true,
            enable_rag: false,
            toolboxes: default_toolboxes(),
            colors: ColorsConfig::default(),
            server: ServerConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(rest)
    } else if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(path)
    }
}
