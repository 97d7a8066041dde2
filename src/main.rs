//! StableHaus development server
//!
//! Usage:
//!   stablehaus --memory --port 3000
//!   stablehaus --config stablehaus.toml

use anyhow::{Context, Result};
use clap::Parser;
use stablehaus::{App, AppConfig, StableHaus, StorageBackend, http::build_router};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stablehaus")]
#[command(about = "Farm and boarding facility management server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep all data in memory instead of PostgreSQL
    #[arg(long)]
    memory: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = load_config(&args)?;
    info!(backend = ?config.storage.backend, "StableHaus starting");

    let haus = StableHaus::from_config(&config)
        .await
        .context("failed to open storage")?;
    if config.storage.auto_migrate {
        haus.migrate_all(false).await.context("migration failed")?;
    }

    let app = Arc::new(App::new(haus).context("failed to wire application")?);
    let router = build_router(app);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("HTTP API listening on {}", address);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
