//! # satstake-node: storage, staking service, HTTP API.
//!
//! Composes the satstake core into a running service:
//! - [`storage::RocksStore`]: persistent record store backed by RocksDB
//! - [`service::StakingService`]: admission, reward queries, withdrawal intake
//! - [`api`]: axum router exposing the service over HTTP/JSON
//! - [`config::NodeConfig`]: layered service configuration

pub mod api;
pub mod config;
pub mod service;
pub mod storage;

pub use api::{router, serve, ApiState};
pub use config::NodeConfig;
pub use service::StakingService;
pub use storage::RocksStore;
