//! Autocomplete resolution for commands and filesystem paths.
//!
//! One resolver serves both the REPL tab-completion and the
//! `/api/autocomplete` endpoint, so suggestions never diverge between the
//! terminal and the web frontend.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::commands::CommandRegistry;
use crate::config::schema::expand_tilde;

const MAX_SUGGESTIONS: usize = 10;

/// What kind of completion the suggestions are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Command,
    Path,
}

/// Resolved completion: candidate strings plus the fragment they replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub suggestions: Vec<String>,
    #[serde(rename = "type")]
    pub kind: CompletionKind,
    pub prefix: String,
}

impl Completion {
    fn empty(kind: CompletionKind, prefix: &str) -> Self {
        Self {
            suggestions: Vec::new(),
            kind,
            prefix: prefix.to_string(),
        }
    }
}

/// Resolve completions for `text` with the cursor at `cursor_chars`
/// (character offset; defaults to end of text).
pub fn resolve(text: &str, cursor_chars: Option<usize>, registry: &CommandRegistry) -> Completion {
    let upto: String = match cursor_chars {
        Some(n) => text.chars().take(n).collect(),
        None => text.to_string(),
    };
    resolve_before_cursor(&upto, registry)
}

/// Resolve completions for the text before the cursor.
pub fn resolve_before_cursor(upto: &str, registry: &CommandRegistry) -> Completion {
    if let Some(rest) = upto.strip_prefix("//") {
        if !rest.contains(char::is_whitespace) {
            // Still typing the command name.
            let suggestions: Vec<String> = registry
                .names()
                .filter(|name| name.starts_with(rest))
                .take(MAX_SUGGESTIONS)
                .map(|name| format!("//{}", name))
                .collect();
            return Completion {
                suggestions,
                kind: CompletionKind::Command,
                prefix: upto.to_string(),
            };
        }

        // Completing an argument: path completion only for path commands.
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("");
        let arg = parts.next().unwrap_or("").trim_start();
        if registry.get(name).map(|s| s.takes_path).unwrap_or(false) {
            return complete_path(arg);
        }
        return Completion::empty(CompletionKind::Command, upto);
    }

    // Free text completes as a path (file references in chat messages);
    // empty input lists the working directory.
    complete_path(upto)
}

/// Complete a filesystem path fragment.
///
/// A fragment ending in a separator lists that directory; otherwise the
/// parent directory (cwd when there is none) is listed and filtered by the
/// trailing segment. Directories come first and carry a trailing `/`.
fn complete_path(fragment: &str) -> Completion {
    let expanded = expand_tilde(fragment);

    let (dir, seg_prefix, typed_dir) = if fragment.ends_with('/') || fragment.is_empty() {
        (
            if fragment.is_empty() {
                PathBuf::from(".")
            } else {
                expanded
            },
            String::new(),
            fragment.to_string(),
        )
    } else {
        let seg = expanded
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = match expanded.parent() {
            Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from("."),
        };
        // Keep what the user actually typed up to the last separator, so the
        // suggestion can replace the fragment verbatim.
        let typed_dir = match fragment.rfind('/') {
            Some(i) => fragment[..=i].to_string(),
            None => String::new(),
        };
        (parent, seg, typed_dir)
    };

    let suggestions = list_dir(&dir, &seg_prefix, &typed_dir);
    Completion {
        suggestions,
        kind: CompletionKind::Path,
        prefix: fragment.to_string(),
    }
}

fn list_dir(dir: &Path, seg_prefix: &str, typed_dir: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<String> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(seg_prefix) {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            dirs.push(format!("{}{}/", typed_dir, name));
        } else {
            files.push(format!("{}{}", typed_dir, name));
        }
    }
    dirs.sort();
    files.sort();
    dirs.extend(files);
    dirs.truncate(MAX_SUGGESTIONS);
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_command_completion_filters_and_sorts() {
        let reg = CommandRegistry::new();
        let c = resolve("//m", None, &reg);
        assert_eq!(c.kind, CompletionKind::Command);
        assert_eq!(c.prefix, "//m");
        assert_eq!(c.suggestions, vec!["//memory", "//model"]);
    }

    #[test]
    fn test_bare_slashes_list_all_commands() {
        let reg = CommandRegistry::new();
        let c = resolve("//", None, &reg);
        assert_eq!(c.suggestions.len(), MAX_SUGGESTIONS.min(reg.len()));
        assert_eq!(c.suggestions[0], "//cd");
    }

    #[test]
    fn test_empty_input_lists_working_directory() {
        let reg = CommandRegistry::new();
        let c = resolve("", None, &reg);
        assert_eq!(c.kind, CompletionKind::Path);
        assert_eq!(c.prefix, "");
        // Entries of the cwd, never rendered as `//` commands.
        assert!(c.suggestions.iter().all(|s| !s.starts_with("//")));
        assert!(c.suggestions.len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn test_non_path_command_arg_yields_nothing() {
        let reg = CommandRegistry::new();
        let c = resolve("//model gr", None, &reg);
        assert_eq!(c.kind, CompletionKind::Command);
        assert!(c.suggestions.is_empty());
        assert_eq!(c.prefix, "//model gr");
    }

    #[test]
    fn test_cd_arg_completes_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("projects")).unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let reg = CommandRegistry::new();
        let frag = format!("{}/pro", dir.path().display());
        let c = resolve(&format!("//cd {}", frag), None, &reg);
        assert_eq!(c.kind, CompletionKind::Path);
        assert_eq!(c.prefix, frag);
        assert_eq!(c.suggestions.len(), 1);
        assert!(c.suggestions[0].ends_with("projects/"));
    }

    #[test]
    fn test_path_prefix_filter_and_dir_first_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alpha.txt"), "").unwrap();
        fs::create_dir(dir.path().join("alpine")).unwrap();
        fs::write(dir.path().join("beta.txt"), "").unwrap();

        let reg = CommandRegistry::new();
        let frag = format!("{}/al", dir.path().display());
        let c = resolve(&frag, None, &reg);
        assert_eq!(c.kind, CompletionKind::Path);
        assert_eq!(c.suggestions.len(), 2);
        assert!(c.suggestions[0].ends_with("alpine/"));
        assert!(c.suggestions[1].ends_with("alpha.txt"));
    }

    #[test]
    fn test_trailing_separator_lists_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one"), "").unwrap();
        fs::write(dir.path().join("two"), "").unwrap();

        let reg = CommandRegistry::new();
        let frag = format!("{}/", dir.path().display());
        let c = resolve(&frag, None, &reg);
        assert_eq!(c.suggestions.len(), 2);
        assert!(c.suggestions.iter().all(|s| s.starts_with(&frag)));
    }

    #[test]
    fn test_nonexistent_directory_yields_empty() {
        let reg = CommandRegistry::new();
        let c = resolve("/no/such/dir/anywhere/x", None, &reg);
        assert_eq!(c.kind, CompletionKind::Path);
        assert!(c.suggestions.is_empty());
    }

    #[test]
    fn test_cursor_position_truncates_text() {
        let reg = CommandRegistry::new();
        // Cursor after "//me" in "//memory".
        let c = resolve("//memory", Some(4), &reg);
        assert_eq!(c.prefix, "//me");
        assert_eq!(c.suggestions, vec!["//memory"]);
    }

    #[test]
    fn test_suggestion_cap() {
        let dir = tempdir().unwrap();
        for i in 0..15 {
            fs::write(dir.path().join(format!("file{:02}", i)), "").unwrap();
        }
        let reg = CommandRegistry::new();
        let c = resolve(&format!("{}/", dir.path().display()), None, &reg);
        assert_eq!(c.suggestions.len(), MAX_SUGGESTIONS);
    }
}
