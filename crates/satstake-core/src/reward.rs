//! Tiered reward schedule and elapsed-day accrual.
//!
//! The daily rate is a step function of the deposit amount alone:
//! - `0.07 ≤ amount ≤ 5.5` BTC: 0.08 per day
//! - `5.5 < amount ≤ 20` BTC: 0.10 per day
//! - anything else: 0
//!
//! The reward for `d` whole elapsed days is `amount * rate * d`, in plain
//! `f64` arithmetic with no rounding. Rates are flat multipliers, not
//! annualized and not compounded.
//!
//! Tiers are data: a [`RewardSchedule`] evaluates its tier table in order and
//! the first tier containing the amount supplies the rate.

use std::borrow::Cow;
use std::ops::{Bound, RangeBounds};

use crate::constants::{
    LOWER_TIER_CEILING_BTC, LOWER_TIER_RATE, MAX_DEPOSIT_BTC, MILLIS_PER_DAY,
    MIN_DEPOSIT_BTC, UPPER_TIER_RATE,
};

/// One row of the tier table: an amount interval and its daily rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTier {
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
    pub rate: f64,
}

impl RewardTier {
    /// Whether `amount` falls inside this tier. NaN never does.
    pub fn contains(&self, amount: f64) -> bool {
        (self.lower, self.upper).contains(&amount)
    }
}

/// The production tier table.
pub const STANDARD_TIERS: &[RewardTier] = &[
    RewardTier {
        lower: Bound::Included(MIN_DEPOSIT_BTC),
        upper: Bound::Included(LOWER_TIER_CEILING_BTC),
        rate: LOWER_TIER_RATE,
    },
    RewardTier {
        lower: Bound::Excluded(LOWER_TIER_CEILING_BTC),
        upper: Bound::Included(MAX_DEPOSIT_BTC),
        rate: UPPER_TIER_RATE,
    },
];

/// An ordered tier table.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSchedule {
    tiers: Cow<'static, [RewardTier]>,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl RewardSchedule {
    pub fn new(tiers: Vec<RewardTier>) -> Self {
        Self { tiers: Cow::Owned(tiers) }
    }

    /// The production tiers, borrowed from [`STANDARD_TIERS`].
    pub const fn standard() -> Self {
        Self { tiers: Cow::Borrowed(STANDARD_TIERS) }
    }

    /// Daily rate for `amount`: the first matching tier's rate, else 0.
    pub fn rate_for(&self, amount: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| tier.contains(amount))
            .map_or(0.0, |tier| tier.rate)
    }

    /// Reward accrued by `amount` over `elapsed_days` whole days.
    ///
    /// Never fails; amounts outside every tier accrue nothing.
    pub fn compute(&self, amount: f64, elapsed_days: u32) -> f64 {
        amount * self.rate_for(amount) * f64::from(elapsed_days)
    }

    /// Reward at the end of the full staking term.
    pub fn projected(&self, amount: f64, staking_days: u32) -> f64 {
        self.compute(amount, staking_days)
    }
}

/// Reward for `amount` over `elapsed_days` under the standard tiers.
///
/// # Examples
///
/// ```
/// use satstake_core::reward::compute_reward;
/// assert_eq!(compute_reward(10.0, 5), 5.0);
/// assert_eq!(compute_reward(25.0, 5), 0.0);
/// ```
pub fn compute_reward(amount: f64, elapsed_days: u32) -> f64 {
    RewardSchedule::standard().compute(amount, elapsed_days)
}

/// Whole days between `created_at` and `now` (both Unix ms), clamped to
/// `[0, staking_days]`.
///
/// Truncates toward zero: 23h59m is 0 days. A `now` earlier than
/// `created_at` counts as 0 days.
pub fn elapsed_days(created_at: i64, now: i64, staking_days: u32) -> u32 {
    let elapsed_ms = now.saturating_sub(created_at).max(0);
    let whole_days = elapsed_ms / MILLIS_PER_DAY;
    u32::try_from(whole_days)
        .unwrap_or(u32::MAX)
        .min(staking_days)
}
