//! Trait interfaces for satstake.
//!
//! - [`RecordStore`]: append-only deposit and withdrawal storage
//!   ([`MemoryStore`](crate::store::MemoryStore) here, RocksDB in satstake-node)
//! - [`Clock`](crate::clock::Clock): wall-clock source, see [`clock`](crate::clock)

use crate::error::StakeError;
use crate::types::{DepositRecord, WithdrawalRequest};

/// Durable, append-only storage for staking records keyed by wallet.
///
/// Implementations must provide read-your-writes consistency: a deposit
/// returned `Ok` from [`append_deposit`](Self::append_deposit) is visible to
/// the next [`find_deposit_by_wallet`](Self::find_deposit_by_wallet).
///
/// Failures are reported as [`StakeError::Storage`]. The store does not
/// enforce uniqueness per wallet.
pub trait RecordStore: Send + Sync {
    /// The most recently appended deposit for `wallet`, if any.
    fn find_deposit_by_wallet(&self, wallet: &str) -> Result<Option<DepositRecord>, StakeError>;

    /// Append a deposit record. All-or-nothing.
    fn append_deposit(&self, record: &DepositRecord) -> Result<(), StakeError>;

    /// Append a withdrawal request. All-or-nothing.
    fn append_withdrawal(&self, request: &WithdrawalRequest) -> Result<(), StakeError>;

    /// Every deposit for `wallet`, oldest first.
    fn deposits_by_wallet(&self, wallet: &str) -> Result<Vec<DepositRecord>, StakeError>;

    /// Every withdrawal request for `wallet`, oldest first.
    fn withdrawals_by_wallet(&self, wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError>;
}
