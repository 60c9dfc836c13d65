//! HTTP server: REST routes, CORS, and router assembly.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::api::protocol::{AutocompleteRequest, CommandRequest, CommandResponse};
use crate::api::ws;
use crate::commands::shell::AgentShell;
use crate::complete;
use crate::tui::{RED, RESET};

/// Shared state behind every route.
///
/// All shell access is serialized through the mutex; a command never runs
/// while another request is mid-dispatch.
#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Mutex<AgentShell>>,
}

/// Assemble the router with CORS for the configured frontend origins.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/commands", get(list_commands))
        .route("/api/command", post(execute_command))
        .route("/api/autocomplete", post(autocomplete))
        .route("/ws/chat", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let origins = {
        let shell = state.shell.lock().await;
        shell.config.server.allowed_origins.clone()
    };
    let app = build_app(state, &origins);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn current_dir_string() -> String {
    std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_string())
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let shell = state.shell.lock().await;
    Json(json!({
        "name": shell.config.name,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "websocket": "/ws/chat",
            "command": "/api/command",
            "autocomplete": "/api/autocomplete",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let shell = state.shell.lock().await;
    Json(json!({
        "status": "healthy",
        "agent": shell.config.name,
        "cwd": current_dir_string(),
    }))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let shell = state.shell.lock().await;
    Json(json!({
        "name": shell.config.name,
        "provider": shell.config.provider,
        "model": shell.config.model_name,
        "cwd": current_dir_string(),
        "memory_enabled": shell.config.enable_memory,
        "commands_available": shell.registry.len(),
    }))
}

async fn list_commands(State(state): State<AppState>) -> Json<Value> {
    let shell = state.shell.lock().await;
    let commands: Vec<Value> = shell
        .registry
        .specs()
        .map(|spec| {
            json!({
                "name": spec.name,
                "description": spec.description,
                "usage": spec.usage,
            })
        })
        .collect();
    Json(json!({
        "total": commands.len(),
        "commands": commands,
    }))
}

/// Execute a command. Failures are reported in the body (`success: false`),
/// not as HTTP errors, so the frontend renders them like any other result.
async fn execute_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Json<CommandResponse> {
    if req.command.is_empty() {
        return Json(CommandResponse {
            result: "Command is required".to_string(),
            success: false,
            ansi: false,
            cwd: None,
            error: None,
        });
    }

    let mut line = format!("//{}", req.command);
    for arg in &req.args {
        line.push(' ');
        line.push_str(arg);
    }

    let mut shell = state.shell.lock().await;
    match shell.dispatch(&line).await {
        Ok(result) => Json(CommandResponse {
            result,
            success: true,
            ansi: true,
            cwd: Some(current_dir_string()),
            error: None,
        }),
        Err(e) => Json(CommandResponse {
            result: format!("{}Error: {}{}", RED, e, RESET),
            success: false,
            ansi: true,
            cwd: Some(current_dir_string()),
            error: Some(e.to_string()),
        }),
    }
}

async fn autocomplete(
    State(state): State<AppState>,
    Json(req): Json<AutocompleteRequest>,
) -> Json<complete::Completion> {
    let shell = state.shell.lock().await;
    Json(complete::resolve(
        &req.text,
        req.cursor_position,
        &shell.registry,
    ))
}
