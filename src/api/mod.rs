pub mod protocol;
pub mod server;
pub mod ws;

pub use server::{build_app, serve, AppState};
