//! In-memory [`RecordStore`] for tests and ephemeral runs.
//!
//! Keeps per-wallet vectors behind a `RwLock`. No persistence and unbounded
//! growth, so not for production use; the server uses RocksDB (satstake-node).

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::StakeError;
use crate::traits::RecordStore;
use crate::types::{DepositRecord, WithdrawalRequest};

#[derive(Default)]
struct Records {
    /// Deposits per wallet, insertion order.
    deposits: HashMap<String, Vec<DepositRecord>>,
    /// Withdrawal requests per wallet, insertion order.
    withdrawals: HashMap<String, Vec<WithdrawalRequest>>,
}

/// Volatile record store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total deposits across all wallets.
    pub fn deposit_count(&self) -> usize {
        self.inner.read().deposits.values().map(Vec::len).sum()
    }

    /// Total withdrawal requests across all wallets.
    pub fn withdrawal_count(&self) -> usize {
        self.inner.read().withdrawals.values().map(Vec::len).sum()
    }
}

impl RecordStore for MemoryStore {
    fn find_deposit_by_wallet(&self, wallet: &str) -> Result<Option<DepositRecord>, StakeError> {
        Ok(self
            .inner
            .read()
            .deposits
            .get(wallet)
            .and_then(|list| list.last().cloned()))
    }

    fn append_deposit(&self, record: &DepositRecord) -> Result<(), StakeError> {
        self.inner
            .write()
            .deposits
            .entry(record.wallet.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn append_withdrawal(&self, request: &WithdrawalRequest) -> Result<(), StakeError> {
        self.inner
            .write()
            .withdrawals
            .entry(request.wallet.clone())
            .or_default()
            .push(request.clone());
        Ok(())
    }

    fn deposits_by_wallet(&self, wallet: &str) -> Result<Vec<DepositRecord>, StakeError> {
        Ok(self.inner.read().deposits.get(wallet).cloned().unwrap_or_default())
    }

    fn withdrawals_by_wallet(&self, wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError> {
        Ok(self.inner.read().withdrawals.get(wallet).cloned().unwrap_or_default())
    }
}
