//! Error types for satstake.
//!
//! `Display` strings are the client-facing messages returned by the HTTP API,
//! except for [`StakeError::Storage`], whose detail is only ever logged.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing fields")] MissingFields,
    #[error("Deposit out of bounds")] AmountOutOfBounds { amount: f64 },
    #[error("Staking period must be 20–90 days")] StakingPeriodOutOfBounds { days: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StakeError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error("Wallet required")] MissingWallet,
    #[error("No deposit found")] NotFound(String),
    #[error("storage: {0}")] Storage(String),
}
