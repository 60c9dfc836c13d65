//! Configuration loading and saving utilities.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::schema::Config;

/// Get the forgecli data directory (`~/.forgecli`), creating it if needed.
pub fn get_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = home.join(".forgecli");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    dir
}

/// Get the default configuration file path (`~/.forgecli/config.json`).
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.json")
}

/// Resolve the config path: explicit path, else `./agent_config.json` when an
/// exported agent directory is the working directory, else the default path.
fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    if let Some(p) = config_path {
        return p.to_path_buf();
    }
    let local = PathBuf::from("agent_config.json");
    if local.exists() {
        return local;
    }
    get_config_path()
}

/// Load configuration from a file, or return a default [`Config`] if the file
/// does not exist or cannot be parsed.
pub fn load_config(config_path: Option<&Path>) -> Config {
    let path = resolve_config_path(config_path);

    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Config>(&contents) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        "Failed to parse config from {}: {}. Using default configuration.",
                        path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read config from {}: {}. Using default configuration.",
                    path.display(),
                    e
                );
            }
        }
    }

    Config::default()
}

/// Save configuration to a JSON file.
///
/// If `config_path` is `None`, the default path is used. Parent directories
/// are created if they don't exist.
pub fn save_config(config: &Config, config_path: Option<&Path>) {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path(),
    };

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match serde_json::to_string_pretty(config) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                warn!("Failed to write config to {}: {}", path.display(), e);
            }
        }
        Err(e) => {
            warn!("Failed to serialize config: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let path = Path::new("/tmp/forgecli_test_does_not_exist_987654.json");
        let cfg = load_config(Some(path));
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.provider, "groq");
    }

    #[test]
    fn test_load_and_save_roundtrip() {
        let dir = tempdir().unwrap();
        let tmp_path = dir.path().join("config_roundtrip.json");

        let mut cfg = Config::default();
        cfg.model_name = "llama-3.3-70b-versatile".to_string();
        save_config(&cfg, Some(&tmp_path));

        let loaded = load_config(Some(&tmp_path));
        assert_eq!(loaded.model_name, cfg.model_name);
        assert_eq!(loaded.server.port, cfg.server.port);
    }

    #[test]
    fn test_load_garbage_returns_default() {
        let dir = tempdir().unwrap();
        let tmp_path = dir.path().join("garbage.json");
        std::fs::write(&tmp_path, "{not json").unwrap();
        let cfg = load_config(Some(&tmp_path));
        assert_eq!(cfg.name, "Agent");
    }
}
