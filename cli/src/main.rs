// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Agora Directory Daemon
//!
//! The `agora` binary serves the negotiation and session API.
//!
//! ## Commands
//!
//! - `agora serve` - Run the HTTP API (default when no command is given)
//! - `agora config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod seed;
mod server;

use commands::ConfigCommand;

/// Agora - A2A agent directory
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGORA_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (overrides spec.server.port)
    #[arg(long, global = true, env = "AGORA_PORT")]
    port: Option<u16>,

    /// HTTP API host (overrides spec.server.bind_address)
    #[arg(long, global = true, env = "AGORA_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides spec.observability.log_level
    #[arg(long, global = true, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the directory API
    #[command(name = "serve")]
    Serve {
        /// YAML file of agent records loaded into the in-memory directory
        #[arg(long, value_name = "FILE")]
        agents: Option<PathBuf>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { command }) => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"), "compact")?;
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Serve { agents }) => serve(cli.config, cli.host, cli.port, cli.log_level, agents).await,
        None => serve(cli.config, cli.host, cli.port, cli.log_level, None).await,
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    log_level: Option<String>,
    agents: Option<PathBuf>,
) -> Result<()> {
    let mut config = agora_core::domain::config::DirectoryConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    if let Some(host) = host {
        config.spec.server.bind_address = host;
    }
    if let Some(port) = port {
        config.spec.server.port = port;
    }
    if let Some(level) = log_level {
        config.spec.observability.log_level = level;
    }

    init_logging(&config.spec.observability.log_level, &config.spec.observability.log_format)?;

    server::run(config, agents).await
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().init(),
        _ => builder.compact().init(),
    }

    Ok(())
}
