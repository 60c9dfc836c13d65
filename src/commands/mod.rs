//! The `//command` registry.
//!
//! Commands are a fixed table known at startup. A `BTreeMap` keeps them in
//! name order, which feeds both autocomplete and `/api/commands` without a
//! sort at call time.

pub mod shell;

use std::collections::BTreeMap;

/// Static description of one slash command.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    /// Whether the first argument is a filesystem path (drives completion).
    pub takes_path: bool,
}

/// Exact-name lookup table of all registered commands.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        for spec in BUILTIN_COMMANDS {
            commands.insert(spec.name, *spec);
        }
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Command names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// All specs in name order.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> + '_ {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const BUILTIN_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        description: "Show available commands, or help for one command",
        usage: "//help [command]",
        takes_path: false,
    },
    CommandSpec {
        name: "tools",
        description: "List tools available to the agent",
        usage: "//tools",
        takes_path: false,
    },
    CommandSpec {
        name: "status",
        description: "Show agent status and current settings",
        usage: "//status",
        takes_path: false,
    },
    CommandSpec {
        name: "config",
        description: "Show the active configuration",
        usage: "//config",
        takes_path: false,
    },
    CommandSpec {
        name: "system_prompt",
        description: "Show or update the system prompt",
        usage: "//system_prompt [new prompt]",
        takes_path: false,
    },
    CommandSpec {
        name: "model",
        description: "Show or switch the provider and model",
        usage: "//model [provider] [model]",
        takes_path: false,
    },
    CommandSpec {
        name: "memory",
        description: "Inspect or clear conversation memory",
        usage: "//memory [status|show|clear]",
        takes_path: false,
    },
    CommandSpec {
        name: "rag",
        description: "Knowledge base status and search",
        usage: "//rag [status|search <query>]",
        takes_path: false,
    },
    CommandSpec {
        name: "clear",
        description: "Clear the screen",
        usage: "//clear",
        takes_path: false,
    },
    CommandSpec {
        name: "cd",
        description: "Change the working directory",
        usage: "//cd <path>",
        takes_path: true,
    },
    CommandSpec {
        name: "pwd",
        description: "Print the working directory",
        usage: "//pwd",
        takes_path: false,
    },
    CommandSpec {
        name: "list",
        description: "List files in the working directory",
        usage: "//list [path]",
        takes_path: false,
    },
];

/// Split a `//name args...` line into the command token and its arguments.
///
/// Returns `None` when the line does not start with `//` or has no command
/// token after the prefix.
pub fn parse_command_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let rest = line.strip_prefix("//")?.trim();
    let mut parts = rest.split_whitespace();
    let name = parts.next()?;
    Some((name, parts.collect()))
}
