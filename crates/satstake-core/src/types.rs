//! Record and message types shared by the store, the service, and the API.

use serde::{Deserialize, Serialize};

use crate::constants::MILLIS_PER_DAY;

/// A deposit pledged into the staking program.
///
/// Created only by a successful admission and never mutated afterwards.
/// `created_at` is Unix milliseconds (UTC).
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    /// Externally supplied wallet identifier. Not format-checked, not unique.
    pub wallet: String,
    /// Deposit size in BTC.
    pub amount: f64,
    /// Committed term in days.
    pub staking_days: u32,
    /// Creation time, Unix milliseconds.
    pub created_at: i64,
}

impl DepositRecord {
    /// Time at which accrual stops, Unix milliseconds.
    pub fn term_ends_at(&self) -> i64 {
        self.created_at
            .saturating_add(i64::from(self.staking_days).saturating_mul(MILLIS_PER_DAY))
    }
}

/// A request to withdraw, recorded against a wallet.
///
/// Intentionally not linked to any [`DepositRecord`].
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub wallet: String,
    /// Intake time, Unix milliseconds.
    pub requested_at: i64,
}

/// Raw deposit parameters as received from a client.
///
/// Every field is optional so that absent fields surface as
/// [`ValidationError::MissingFields`](crate::error::ValidationError::MissingFields)
/// rather than as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepositRequest {
    pub wallet: Option<String>,
    pub amount: Option<f64>,
    pub staking_days: Option<f64>,
}

impl DepositRequest {
    pub fn new(wallet: impl Into<String>, amount: f64, staking_days: f64) -> Self {
        Self {
            wallet: Some(wallet.into()),
            amount: Some(amount),
            staking_days: Some(staking_days),
        }
    }
}

/// Result of a successful admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    /// The record as persisted.
    pub record: DepositRecord,
    /// Custodial address the depositor must send funds to.
    pub forward_to: String,
}

/// One entry of a wallet's deposit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatement {
    #[serde(flatten)]
    pub record: DepositRecord,
    /// See [`DepositRecord::term_ends_at`].
    pub term_ends_at: i64,
    /// Reward the deposit will have accrued once its term is over.
    pub projected_reward: f64,
}

/// Accrued reward for a wallet's deposit at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSummary {
    /// Deposit size in BTC.
    pub amount: f64,
    /// Whole elapsed days, clamped to the staking term.
    pub days: u32,
    /// Accrued reward in BTC.
    pub rewards: f64,
}
