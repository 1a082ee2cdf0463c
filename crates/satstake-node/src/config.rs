//! Service configuration.
//!
//! [`NodeConfig`] starts from built-in defaults, then layers an optional TOML
//! file and `SATSTAKE_*` environment variables on top (via the `config`
//! crate). The binary applies CLI overrides last. The custodial deposit
//! address is read once here and never changes for the life of the process.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use satstake_core::constants::{DEFAULT_DEPOSIT_ADDRESS, DEFAULT_HTTP_PORT};

/// Prefix for environment overrides, e.g. `SATSTAKE_PORT=8080`.
pub const ENV_PREFIX: &str = "SATSTAKE";

/// Configuration for a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// IP address for the HTTP server to bind to.
    pub bind_addr: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Custodial BTC address depositors are told to send funds to.
    pub deposit_address: String,
    /// Log level filter string (e.g. "info", "debug", "satstake_node_lib=trace").
    pub log_level: String,
    /// Log output format, "text" or "json".
    pub log_format: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("satstake");

        Self {
            data_dir,
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_HTTP_PORT,
            deposit_address: DEFAULT_DEPOSIT_ADDRESS.to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl NodeConfig {
    /// Build the layered configuration: defaults, then `file` (if given),
    /// then `SATSTAKE_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deposit_address.trim().is_empty() {
            return Err(ConfigError::Message("deposit_address must not be empty".into()));
        }
        Ok(())
    }

    /// Path to the RocksDB record directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("stakedata")
    }

    /// Socket address string for the HTTP server.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
