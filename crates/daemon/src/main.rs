//! PassView Daemon
//!
//! Web service for browsing and decrypting a GPG password store.

use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::{Parser, Subcommand};
use daemon::config::{default_config_path, Config};
use daemon::server::{ApiServer, AppState};
use daemon::store::filter;
use daemon::ui::SignalHandler;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// PassView - browse and decrypt a GPG password store over HTTP.
#[derive(Parser, Debug)]
#[command(name = "passview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Password store directory (overrides config and PASSWORD_STORE_DIR)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Address to listen on (overrides config and PASSVIEW_BIND_ADDR)
    #[arg(short, long, global = true, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API and browser client
    Serve,

    /// Print the entry tree as JSON
    Tree {
        /// Only show entries and directories matching this query
        query: Option<String>,
    },

    /// Check configuration, store and required programs
    Check,
}

impl Cli {
    /// Load configuration and apply environment and command-line overrides.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };

        config.apply_env_overrides();

        if let Some(store) = &self.store {
            config.store.root = store.clone();
        }
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if self.verbose {
            config.daemon.log_level = "debug".to_string();
        }

        Ok(config)
    }
}

/// Install the global subscriber: stderr always, plus a daily log file when
/// `log_dir` is set. The returned guard must be held until exit.
fn init_tracing(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.daemon.log_level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &config.daemon.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("passview")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}

/// Open the store root, exiting the process if it is unusable.
fn open_state(config: &Config) -> AppState {
    match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Cannot open password store: {}", e);
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.resolve_config()?;
    config.validate()?;
    let _log_guard = init_tracing(&config)?;

    tracing::info!("PassView starting...");

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Tree { query } => print_tree(config, query).await,
        Commands::Check => check(&config, cli.config.as_ref()),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = open_state(&config);
    tracing::info!("Serving password store at {}", state.builder.root().path().display());

    let addr = config.bind_addr()?;
    let server = ApiServer::bind(addr, state)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(SignalHandler::new(shutdown.clone()).run());

    server.run(shutdown).await?;

    tracing::info!("PassView stopped");
    Ok(())
}

async fn print_tree(config: Config, query: Option<String>) -> anyhow::Result<()> {
    let state = open_state(&config);
    let tree = state.load_tree().await?;

    let tree = match query {
        Some(query) => filter(&tree, &query),
        None => tree,
    };

    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn check(config: &Config, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut failed = false;

    let config_path = config_path.cloned().unwrap_or_else(default_config_path);
    println!("Config:      {}", config_path.display());
    println!("Listen:      {}", config.server.bind_addr);

    match AppState::from_config(config) {
        Ok(state) => println!("Store:       {}", state.builder.root().path().display()),
        Err(e) => {
            println!("Store:       ERROR {}", e);
            failed = true;
        }
    }

    let mut programs = vec![("Decryptor:", &config.gpg.program)];
    if config.gpg.reset_agent {
        programs.push(("Agent:", &config.gpg.agent_program));
    }
    for (label, program) in programs {
        match which::which(program) {
            Ok(path) => println!("{:<12} {}", label, path.display()),
            Err(e) => {
                println!("{:<12} ERROR {}: {}", label, program, e);
                failed = true;
            }
        }
    }

    if failed {
        exit(1);
    }
    println!("All checks passed");
    Ok(())
}
