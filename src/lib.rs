pub mod agent;
pub mod api;
pub mod commands;
pub mod complete;
pub mod config;
pub mod errors;
pub mod providers;
pub mod repl;
pub mod session;
pub mod tui;
