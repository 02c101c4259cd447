//! Trust router daemon entry point
//!
//! Usage:
//!   trust-router --config /etc/trust_router/router.toml
//!   trust-router --config router.toml --log-level debug

use anyhow::{Context, Result};
use clap::Parser;
use router_config::RouterConfig;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trust_router::{spawn_sweeper, MonitorCommand, MonitorHandlers, RouterState};

#[derive(Parser, Debug)]
#[command(name = "trust-router")]
#[command(about = "Trust router: community routing and TID request admission")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level '{}'", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = RouterConfig::load(&args.config)
        .with_context(|| format!("Failed to load {:?}", args.config))?;
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.router.log_level.clone());
    init_logging(&level)?;

    info!("Starting trust router {}", config.router.hostname);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let state = match RouterState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Refusing to start: {}", e);
            return Err(e.into());
        }
    };

    let monitor = MonitorHandlers::with_defaults();
    for command in MonitorCommand::ALL {
        if let Ok(view) = monitor.handle(command, &state) {
            info!("{}: {}", command, view["response"]);
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(
        state.clone(),
        Duration::from_secs(config.trp.sweep_interval_secs),
        shutdown_rx,
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    shutdown_tx.send(true).ok();
    if let Err(e) = sweeper.await {
        error!("Sweeper task failed: {}", e);
    }

    info!("Trust router stopped");
    Ok(())
}
