//! Tillage CLI
//!
//! # Commands
//! - `tillage serve` - Run the plot server
//! - `tillage init-db` - Create the PostgreSQL tables

mod config;
mod observe;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Settings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tillage_core::{MemoryStore, PlayerStore, PlotEngine, PlotStore};
use tillage_db::{PgStore, PostgresPool, init_schema};
use tillage_flow::SystemClock;
use tillage_http::App;

/// Tillage plot server
#[derive(Parser)]
#[command(name = "tillage")]
#[command(author, version, about = "Farm plot backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (default: 8080)
        #[arg(long)]
        port: Option<u16>,

        /// Keep everything in memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Create the database tables if they are missing
    InitDb {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            memory,
        } => {
            let settings = Settings::load(config.as_deref())?
                .with_env()?
                .with_port(port);
            observe::init_stdout_tracing(&settings.log_filter);
            run_serve_command(&settings, memory).await
        }
        Commands::InitDb { config } => {
            let settings = Settings::load(config.as_deref())?.with_env()?;
            observe::init_stdout_tracing(&settings.log_filter);
            run_init_db_command(&settings).await
        }
    }
}

async fn run_serve_command(settings: &Settings, memory: bool) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    if memory {
        tracing::warn!("Using in-memory storage; nothing survives a restart");
        return serve_with(addr, MemoryStore::new()).await;
    }

    let pool = PostgresPool::new(settings.require_database_url()?)
        .await
        .context("Failed to connect to database")?;
    pool.ping().await.context("Database is not answering")?;
    serve_with(addr, PgStore::new(pool)).await
}

async fn serve_with<S>(addr: SocketAddr, store: S) -> Result<()>
where
    S: PlotStore + PlayerStore,
{
    let engine = PlotEngine::new(store, SystemClock);
    let app = App::new(Arc::new(engine))?;
    tillage_http::serve(addr, app, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn run_init_db_command(settings: &Settings) -> Result<()> {
    let pool = PostgresPool::new(settings.require_database_url()?)
        .await
        .context("Failed to connect to database")?;
    init_schema(&pool).await.context("Failed to create tables")?;
    tracing::info!("Schema ready");
    pool.close().await;
    Ok(())
}
