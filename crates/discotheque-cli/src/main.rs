// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use discotheque_application::AppState;
use discotheque_config::load as load_config;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{execute_command, Commands};

/// Browse the Discogs music catalog
#[derive(Parser, Debug)]
#[command(name = "discotheque", version, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.telemetry.log_level.as_str()
    };
    init_tracing(level);

    let state = AppState::new(config)?;
    state.on_start();

    info!(target: "cli", command = ?cli.command, "running command");
    let mut stdout = std::io::stdout().lock();
    execute_command(cli.command, &state, &mut stdout).await
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
