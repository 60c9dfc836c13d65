//! Session management for conversation history.
//!
//! Sessions are stored as JSONL files under `~/.forgecli/sessions`. The first
//! line is a metadata header (with `_type: "metadata"`), followed by one JSON
//! object per message. Sessions are created on first message; the external
//! memory store owns long-term retention, so no deletion surface exists
//! beyond `clear`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::warn;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A conversation session keyed by an opaque correlation identifier.
pub struct Session {
    pub key: String,
    /// Ordered list of messages. Each value is a JSON object with at least
    /// `role`, `content`, and `timestamp` fields.
    pub messages: Vec<Value>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Session {
    /// Create a brand-new, empty session.
    pub fn new(key: &str) -> Self {
        let now = Local::now();
        Self {
            key: key.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the session with the current timestamp.
    pub fn add_message(&mut self, role: &str, content: &str) {
        let msg = json!({
            "role": role,
            "content": content,
            "timestamp": Local::now().to_rfc3339(),
        });
        self.messages.push(msg);
        self.updated_at = Local::now();
    }

    /// Return the last `max_messages` messages in LLM format (just `role` +
    /// `content`).
    pub fn get_history(&self, max_messages: usize) -> Vec<Value> {
        let start = self.messages.len().saturating_sub(max_messages);
        self.messages[start..]
            .iter()
            .map(|m| {
                json!({
                    "role": m.get("role").and_then(|v| v.as_str()).unwrap_or("user"),
                    "content": m.get("content").and_then(|v| v.as_str()).unwrap_or(""),
                })
            })
            .collect()
    }

    /// Clear all messages in the session.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Local::now();
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Manages conversation sessions.
///
/// Thread-safe: the cache is protected by a Mutex so the REPL and the API
/// server tasks can access sessions concurrently. Each session's turns are
/// strictly sequential, so one lock suffices.
pub struct SessionStore {
    sessions_dir: PathBuf,
    cache: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create a new `SessionStore` persisting under `sessions_dir`.
    pub fn new(sessions_dir: PathBuf) -> Self {
        if !sessions_dir.exists() {
            let _ = fs::create_dir_all(&sessions_dir);
        }
        Self {
            sessions_dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store rooted at the default data directory.
    pub fn default_store() -> Self {
        Self::new(crate::config::loader::get_data_dir().join("sessions"))
    }

    /// Get the history for a session, creating it if needed.
    pub async fn get_history(&self, key: &str, max_messages: usize) -> Vec<Value> {
        let mut cache = self.cache.lock().await;
        let session = Self::get_or_create(&mut cache, key, &self.sessions_dir);
        session.get_history(max_messages)
    }

    /// Number of messages recorded for a session.
    pub async fn message_count(&self, key: &str) -> usize {
        let mut cache = self.cache.lock().await;
        let session = Self::get_or_create(&mut cache, key, &self.sessions_dir);
        session.messages.len()
    }

    /// Add a user/assistant turn pair to a session and persist it.
    pub async fn add_turn(&self, key: &str, user: &str, assistant: &str) {
        let mut cache = self.cache.lock().await;
        let session = Self::get_or_create(&mut cache, key, &self.sessions_dir);
        session.add_message("user", user);
        session.add_message("assistant", assistant);
        Self::save_session(session, &self.sessions_dir);
    }

    /// Clear a session's messages, in cache and on disk.
    pub async fn clear(&self, key: &str) {
        let mut cache = self.cache.lock().await;
        let session = Self::get_or_create(&mut cache, key, &self.sessions_dir);
        session.clear();
        Self::save_session(session, &self.sessions_dir);
    }

    fn get_or_create<'a>(
        cache: &'a mut HashMap<String, Session>,
        key: &str,
        sessions_dir: &Path,
    ) -> &'a mut Session {
        cache.entry(key.to_string()).or_insert_with(|| {
            Self::load_session(key, sessions_dir).unwrap_or_else(|| Session::new(key))
        })
    }

    fn session_path(key: &str, sessions_dir: &Path) -> PathBuf {
        // Session keys may contain ':' (e.g. "cli:default"); keep filenames safe.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        sessions_dir.join(format!("{}.jsonl", safe))
    }

    fn load_session(key: &str, sessions_dir: &Path) -> Option<Session> {
        let path = Self::session_path(key, sessions_dir);
        let content = fs::read_to_string(&path).ok()?;
        let mut lines = content.lines();

        let header: Value = serde_json::from_str(lines.next()?).ok()?;
        if header.get("_type").and_then(|v| v.as_str()) != Some("metadata") {
            return None;
        }

        let mut session = Session::new(key);
        if let Some(created) = header
            .get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            session.created_at = created.with_timezone(&Local);
        }
        for line in lines {
            match serde_json::from_str::<Value>(line) {
                Ok(msg) => session.messages.push(msg),
                Err(e) => warn!("Skipping corrupt session line in {}: {}", path.display(), e),
            }
        }
        Some(session)
    }

    fn save_session(session: &Session, sessions_dir: &Path) {
        let path = Self::session_path(&session.key, sessions_dir);
        let mut out = String::new();
        let header = json!({
            "_type": "metadata",
            "key": session.key,
            "created_at": session.created_at.to_rfc3339(),
            "updated_at": session.updated_at.to_rfc3339(),
        });
        out.push_str(&header.to_string());
        out.push('\n');
        for msg in &session.messages {
            out.push_str(&msg.to_string());
            out.push('\n');
        }
        if let Err(e) = fs::write(&path, out) {
            warn!("Failed to save session {}: {}", path.display(), e);
        }
    }
}
