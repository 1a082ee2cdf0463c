//! satstake HTTP server.
//!
//! Opens the RocksDB record store, wires it into the staking service, and
//! serves the deposit / rewards / withdrawal API until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use satstake_core::store::MemoryStore;
use satstake_core::traits::RecordStore;
use satstake_node_lib::{serve, ApiState, NodeConfig, RocksStore, StakingService};

/// Custodial BTC staking service.
#[derive(Parser, Debug)]
#[command(
    name = "satstake-server",
    version,
    about = "Custodial BTC staking deposits with tiered reward accrual"
)]
struct Args {
    /// TOML config file (layered under SATSTAKE_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the record store
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long)]
    bind_addr: Option<String>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Custodial BTC address depositors are told to send funds to
    #[arg(long)]
    deposit_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long)]
    log_format: Option<String>,

    /// Keep records in memory only (lost on exit)
    #[arg(long)]
    ephemeral: bool,
}

impl Args {
    /// Load the layered config, then apply CLI overrides on top.
    fn into_config(self) -> Result<(NodeConfig, bool)> {
        let mut config = NodeConfig::load(self.config.as_deref())
            .context("Failed to load satstake configuration")?;

        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(address) = self.deposit_address {
            config.deposit_address = address;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config.validate().context("Invalid configuration")?;

        Ok((config, self.ephemeral))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, ephemeral) = Args::parse().into_config()?;

    init_logging(&config.log_level, &config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        bind = %config.http_addr(),
        deposit_address = %config.deposit_address,
        ephemeral,
        "Starting satstake-server"
    );

    let store: Arc<dyn RecordStore> = if ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data_dir {}", config.data_dir.display())
        })?;
        let store = RocksStore::open(config.db_path())
            .with_context(|| format!("Failed to open record store at {}", config.db_path().display()))?;
        Arc::new(store)
    };

    let service = StakingService::new(store, config.deposit_address.clone());
    let state = ApiState::new(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.http_addr()))?;

    serve(listener, state, shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("satstake-server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server runs
/// until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down..."),
        Err(e) => {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str`. Pass `format = "json"` for
/// structured JSON output; any other value gives human-readable text.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
