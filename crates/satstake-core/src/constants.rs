//! Program constants. Amounts are in whole BTC (`f64`), times in Unix milliseconds.

/// Smallest deposit accepted into the staking program, in BTC (inclusive).
pub const MIN_DEPOSIT_BTC: f64 = 0.07;

/// Largest deposit accepted into the staking program, in BTC (inclusive).
pub const MAX_DEPOSIT_BTC: f64 = 20.0;

/// Upper bound of the lower reward tier, in BTC (inclusive).
pub const LOWER_TIER_CEILING_BTC: f64 = 5.5;

/// Daily reward rate for deposits in `[MIN_DEPOSIT_BTC, LOWER_TIER_CEILING_BTC]`.
pub const LOWER_TIER_RATE: f64 = 0.08;

/// Daily reward rate for deposits in `(LOWER_TIER_CEILING_BTC, MAX_DEPOSIT_BTC]`.
pub const UPPER_TIER_RATE: f64 = 0.10;

/// Shortest staking term, in days (inclusive).
pub const MIN_STAKING_DAYS: u32 = 20;

/// Longest staking term, in days (inclusive).
pub const MAX_STAKING_DAYS: u32 = 90;

/// Length of one accrual day.
///
/// Elapsed time is divided by this and truncated; partial days never accrue.
///
/// # Examples
///
/// ```
/// use satstake_core::constants::MILLIS_PER_DAY;
/// assert_eq!(MILLIS_PER_DAY, 24 * 60 * 60 * 1000);
/// ```
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Custodial receive address used when no other address is configured.
pub const DEFAULT_DEPOSIT_ADDRESS: &str =
    "bc1qtuvm3t942kmg0swplpj9s7nc0kkzrpmqlt693cnpxg37cgzyhxlqjqexau";

/// Default HTTP listen port.
pub const DEFAULT_HTTP_PORT: u16 = 5000;
