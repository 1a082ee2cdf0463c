//! Deposit admission rules.
//!
//! Checks run in a fixed order and the first failure is returned:
//! 1. all of `wallet`, `amount`, `stakingDays` present and non-empty / non-zero
//! 2. `MIN_DEPOSIT_BTC ≤ amount ≤ MAX_DEPOSIT_BTC`
//! 3. `MIN_STAKING_DAYS ≤ stakingDays ≤ MAX_STAKING_DAYS`, whole days only
//!
//! Validation is pure; persisting the admitted deposit is the service's job.

use crate::constants::{MAX_DEPOSIT_BTC, MAX_STAKING_DAYS, MIN_DEPOSIT_BTC, MIN_STAKING_DAYS};
use crate::error::{StakeError, ValidationError};
use crate::types::{DepositRecord, DepositRequest};

/// Deposit parameters that passed every admission check.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedDeposit {
    pub wallet: String,
    pub amount: f64,
    pub staking_days: u32,
}

impl AdmittedDeposit {
    /// Stamp the admitted deposit with its creation time.
    pub fn into_record(self, created_at: i64) -> DepositRecord {
        DepositRecord {
            wallet: self.wallet,
            amount: self.amount,
            staking_days: self.staking_days,
            created_at,
        }
    }
}

/// Run the admission checks against a raw request.
pub fn validate_deposit(req: &DepositRequest) -> Result<AdmittedDeposit, ValidationError> {
    let (wallet, amount, days) = match (&req.wallet, req.amount, req.staking_days) {
        (Some(w), Some(a), Some(d)) if !w.is_empty() && is_truthy(a) && is_truthy(d) => (w, a, d),
        _ => return Err(ValidationError::MissingFields),
    };

    if !(MIN_DEPOSIT_BTC..=MAX_DEPOSIT_BTC).contains(&amount) {
        return Err(ValidationError::AmountOutOfBounds { amount });
    }

    let staking_days = whole_staking_days(days)
        .ok_or(ValidationError::StakingPeriodOutOfBounds { days })?;

    Ok(AdmittedDeposit {
        wallet: wallet.clone(),
        amount,
        staking_days,
    })
}

/// A withdrawal only needs a non-empty wallet.
pub fn require_wallet(wallet: Option<&str>) -> Result<&str, StakeError> {
    match wallet {
        Some(w) if !w.is_empty() => Ok(w),
        _ => Err(StakeError::MissingWallet),
    }
}

/// Zero and NaN count as absent.
fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn whole_staking_days(days: f64) -> Option<u32> {
    if days.fract() != 0.0 {
        return None;
    }
    let range = f64::from(MIN_STAKING_DAYS)..=f64::from(MAX_STAKING_DAYS);
    range.contains(&days).then_some(days as u32)
}
