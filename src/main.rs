use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use forgecli::api::{self, AppState};
use forgecli::commands::shell::AgentShell;
use forgecli::config::loader::{get_config_path, get_data_dir, load_config, save_config};
use forgecli::config::schema::{expand_tilde, Config};
use forgecli::providers::create_provider;
use forgecli::repl;
use forgecli::session::SessionStore;

#[derive(Parser)]
#[command(name = "forgecli", version, about = "Config-driven agent shell and API server")]
struct Cli {
    /// Path to the agent config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file.
    Onboard,
    /// Start the interactive shell (default).
    Chat {
        /// Project directory to start in.
        project_dir: Option<String>,
        /// Session key for conversation memory.
        #[arg(long)]
        session: Option<String>,
        /// Run without conversation memory.
        #[arg(long)]
        no_memory: bool,
    },
    /// Start the REST + WebSocket API server.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the active configuration summary.
    Status,
}

/// Interactive mode logs to a rolling file so log lines never interleave
/// with the prompt; other modes log to stderr. The guard must stay alive for
/// the process lifetime.
fn init_logging(interactive: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if interactive {
        let logs_dir = get_data_dir().join("logs");
        let appender = tracing_appender::rolling::daily(logs_dir, "forgecli.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat {
        project_dir: None,
        session: None,
        no_memory: false,
    });

    let interactive = matches!(command, Commands::Chat { .. });
    let _log_guard = init_logging(interactive);

    match command {
        Commands::Onboard => run_onboard(cli.config),
        Commands::Chat {
            project_dir,
            session,
            no_memory,
        } => run_chat(cli.config, project_dir, session, no_memory),
        Commands::Serve { host, port } => run_serve(cli.config, host, port),
        Commands::Status => run_status(cli.config),
    }
}

fn run_onboard(config_path: Option<PathBuf>) -> Result<()> {
    let path = config_path.unwrap_or_else(get_config_path);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    save_config(&Config::default(), Some(&path));
    println!("Wrote default config to {}", path.display());
    println!("Set the provider API key (e.g. GROQ_API_KEY) and run `forgecli chat`.");
    Ok(())
}

fn build_shell(config_path: Option<PathBuf>, no_memory: bool) -> Result<AgentShell> {
    let mut config = load_config(config_path.as_deref());
    if no_memory {
        config.enable_memory = false;
    }
    let provider = create_provider(&config.provider)?;
    Ok(AgentShell::new(
        config,
        config_path,
        provider,
        SessionStore::default_store(),
    ))
}

fn run_chat(
    config_path: Option<PathBuf>,
    project_dir: Option<String>,
    session: Option<String>,
    no_memory: bool,
) -> Result<()> {
    if let Some(dir) = project_dir {
        std::env::set_current_dir(expand_tilde(&dir))?;
    }

    let mut shell = build_shell(config_path, no_memory)?;
    if let Some(session) = session {
        shell.session_id = format!("cli:{}", session);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(repl::run_repl(&mut shell))
}

fn run_serve(config_path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let shell = build_shell(config_path, false)?;
    let host = host.unwrap_or_else(|| shell.config.server.host.clone());
    let port = port.unwrap_or(shell.config.server.port);

    let state = AppState {
        shell: Arc::new(Mutex::new(shell)),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(api::serve(state, &host, port))
}

fn run_status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());
    println!("Agent: {}", config.name);
    println!("Provider: {} ({})", config.provider, config.model_name);
    println!("Server: {}:{}", config.server.host, config.server.port);
    println!(
        "Memory: {} | RAG: {} | Shell: {}",
        config.enable_memory, config.enable_rag, config.enable_shell
    );
    println!("Toolboxes: {}", config.toolboxes.join(", "));
    Ok(())
}
