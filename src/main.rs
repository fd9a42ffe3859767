//! immo-api server binary
//!
//! Serves eleven read-only endpoints over a pre-populated SQLite dataset
//! of real-estate transactions and fiscal income records.
//!
//! Usage:
//!   immo-api --database ./dataset.db
//!   immo-api --database ./dataset.db --bind 0.0.0.0:8080 --cors-permissive
//!   RUST_LOG=immo_api=debug immo-api --database ./dataset.db

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use immo_api::db::create_pool;
use immo_api::http::{run_server, ServerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "immo-api",
    version,
    about = "Read-only HTTP API over French real-estate transactions and fiscal income data"
)]
struct Cli {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    bind: SocketAddr,

    /// Path to the SQLite dataset file (opened read-only)
    #[arg(long, env = "IMMO_DATABASE")]
    database: PathBuf,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    cors_permissive: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,
}

/// Initialize tracing with console output.
fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.debug)?;

    let pool = create_pool(&cli.database).await.with_context(|| {
        format!("Failed to open dataset at {}", cli.database.display())
    })?;
    tracing::info!(dataset = %cli.database.display(), "Dataset opened read-only");

    let config = ServerConfig {
        bind_addr: cli.bind,
        cors_permissive: cli.cors_permissive,
    };

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
