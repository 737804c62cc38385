//! payroll-engine server binary.
//!
//! Reads a YAML configuration file (optional), opens the SQLite store,
//! fails any payroll run left in progress by a previous process, and serves
//! the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use payroll_engine::{
    api::{AppState, create_router},
    config::{ConfigLoader, EngineConfig},
    engine::Engine,
    store::SqliteStore,
};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Payroll engine server")]
struct Cli {
    /// Path to the YAML configuration file. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the SQLite database path.
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?
            .into_config(),
        None => EngineConfig::default(),
    };
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let store = SqliteStore::open(&config.database.path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database.path.display()
        )
    })?;
    tracing::info!(path = %config.database.path.display(), "opened SQLite store");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let engine = Engine::new(Arc::new(store), config);

    let recovered = engine
        .recover_stale_runs()
        .context("failed to recover interrupted payroll runs")?;
    if !recovered.is_empty() {
        tracing::warn!(count = recovered.len(), "marked interrupted payroll runs as failed");
    }

    let app = create_router(AppState::new(engine));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
