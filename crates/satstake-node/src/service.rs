//! Staking service: deposit admission, reward queries, and withdrawal intake.
//!
//! [`StakingService`] owns no state of its own beyond configuration. Records
//! live in the injected [`RecordStore`] and time comes from the injected
//! [`Clock`], so the service is shared freely across request handlers as an
//! `Arc<StakingService>`.

use std::sync::Arc;

use tracing::{debug, error, info};

use satstake_core::clock::{Clock, SystemClock};
use satstake_core::error::StakeError;
use satstake_core::reward::{elapsed_days, RewardSchedule};
use satstake_core::traits::RecordStore;
use satstake_core::types::{
    DepositReceipt, DepositRecord, DepositRequest, DepositStatement, RewardSummary,
    WithdrawalRequest,
};
use satstake_core::validation::{require_wallet, validate_deposit};

pub struct StakingService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    schedule: RewardSchedule,
    deposit_address: String,
}

impl StakingService {
    /// Service on the system clock with the standard reward tiers.
    pub fn new(store: Arc<dyn RecordStore>, deposit_address: impl Into<String>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), deposit_address)
    }

    pub fn with_clock(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        deposit_address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            schedule: RewardSchedule::default(),
            deposit_address: deposit_address.into(),
        }
    }

    /// Replace the reward tier table.
    pub fn with_schedule(mut self, schedule: RewardSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// The custodial receive address. Identical on every call.
    pub fn deposit_address(&self) -> &str {
        &self.deposit_address
    }

    /// Validate and persist a deposit.
    ///
    /// Nothing is written unless every admission check passes. On success the
    /// receipt carries the stored record and the address to forward funds to.
    pub fn admit(&self, req: &DepositRequest) -> Result<DepositReceipt, StakeError> {
        let admitted = validate_deposit(req).inspect_err(|e| {
            debug!(wallet = ?req.wallet, amount = ?req.amount, days = ?req.staking_days, error = %e, "deposit rejected");
        })?;

        let record = admitted.into_record(self.clock.now_ms());
        self.store.append_deposit(&record).inspect_err(|e| {
            error!(wallet = %record.wallet, error = %e, "failed to store deposit");
        })?;

        info!(
            wallet = %record.wallet,
            amount = record.amount,
            staking_days = record.staking_days,
            "deposit recorded"
        );

        Ok(DepositReceipt {
            record,
            forward_to: self.deposit_address.clone(),
        })
    }

    /// Reward accrued so far by the wallet's most recent deposit.
    ///
    /// Elapsed days are whole days since creation, clamped to the staking
    /// term, so the result stops growing once the term is over.
    pub fn query_rewards(&self, wallet: &str) -> Result<RewardSummary, StakeError> {
        let record = self
            .store
            .find_deposit_by_wallet(wallet)
            .inspect_err(|e| error!(%wallet, error = %e, "deposit lookup failed"))?
            .ok_or_else(|| StakeError::NotFound(wallet.to_string()))?;

        Ok(self.summarize(&record, self.clock.now_ms()))
    }

    /// Record a withdrawal request. Only the wallet's presence is checked.
    pub fn request_withdrawal(&self, wallet: Option<&str>) -> Result<WithdrawalRequest, StakeError> {
        let wallet = require_wallet(wallet)?;
        let request = WithdrawalRequest {
            wallet: wallet.to_string(),
            requested_at: self.clock.now_ms(),
        };

        self.store.append_withdrawal(&request).inspect_err(|e| {
            error!(%wallet, error = %e, "failed to store withdrawal request");
        })?;

        info!(%wallet, "withdrawal request received");
        Ok(request)
    }

    /// Every deposit recorded for `wallet`, oldest first, with its term end
    /// and full-term reward. A wallet with no deposits is `NotFound`.
    pub fn deposits(&self, wallet: &str) -> Result<Vec<DepositStatement>, StakeError> {
        let records = self
            .store
            .deposits_by_wallet(wallet)
            .inspect_err(|e| error!(%wallet, error = %e, "deposit history lookup failed"))?;
        if records.is_empty() {
            return Err(StakeError::NotFound(wallet.to_string()));
        }

        Ok(records
            .into_iter()
            .map(|record| DepositStatement {
                term_ends_at: record.term_ends_at(),
                projected_reward: self.schedule.projected(record.amount, record.staking_days),
                record,
            })
            .collect())
    }

    /// Every withdrawal request filed for `wallet`, oldest first. May be empty.
    pub fn withdrawals(&self, wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError> {
        self.store
            .withdrawals_by_wallet(wallet)
            .inspect_err(|e| error!(%wallet, error = %e, "withdrawal history lookup failed"))
    }

    fn summarize(&self, record: &DepositRecord, now: i64) -> RewardSummary {
        let days = elapsed_days(record.created_at, now, record.staking_days);
        RewardSummary {
            amount: record.amount,
            days,
            rewards: self.schedule.compute(record.amount, days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use satstake_core::clock::ManualClock;
    use satstake_core::constants::{DEFAULT_DEPOSIT_ADDRESS, MILLIS_PER_DAY};
    use satstake_core::error::ValidationError;
    use satstake_core::store::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    mock! {
        pub Store {}
        impl RecordStore for Store {
            fn find_deposit_by_wallet(&self, wallet: &str) -> Result<Option<DepositRecord>, StakeError>;
            fn append_deposit(&self, record: &DepositRecord) -> Result<(), StakeError>;
            fn append_withdrawal(&self, request: &WithdrawalRequest) -> Result<(), StakeError>;
            fn deposits_by_wallet(&self, wallet: &str) -> Result<Vec<DepositRecord>, StakeError>;
            fn withdrawals_by_wallet(&self, wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError>;
        }
    }

    fn service() -> (StakingService, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let svc = StakingService::with_clock(store.clone(), clock.clone(), DEFAULT_DEPOSIT_ADDRESS);
        (svc, store, clock)
    }

    fn failing_service(store: MockStore) -> StakingService {
        StakingService::with_clock(Arc::new(store), Arc::new(ManualClock::new(T0)), "bc1qtest")
    }

    // ------------------------------------------------------------------
    // admission
    // ------------------------------------------------------------------

    #[test]
    fn admit_persists_and_returns_address() {
        let (svc, store, _clock) = service();
        let receipt = svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        assert_eq!(receipt.forward_to, DEFAULT_DEPOSIT_ADDRESS);
        assert_eq!(receipt.record.created_at, T0);
        assert_eq!(store.find_deposit_by_wallet("w1").unwrap(), Some(receipt.record));
    }

    #[test]
    fn rejected_deposit_not_persisted() {
        let (svc, store, _clock) = service();
        let err = svc.admit(&DepositRequest::new("w3", 0.05, 30.0)).unwrap_err();
        assert_eq!(err, StakeError::Validation(ValidationError::AmountOutOfBounds { amount: 0.05 }));
        assert_eq!(store.deposit_count(), 0);
    }

    #[test]
    fn missing_fields_reported() {
        let (svc, _store, _clock) = service();
        let err = svc.admit(&DepositRequest::default()).unwrap_err();
        assert_eq!(err, StakeError::Validation(ValidationError::MissingFields));
    }

    #[test]
    fn admit_storage_failure_is_distinct() {
        let mut store = MockStore::new();
        store
            .expect_append_deposit()
            .times(1)
            .returning(|_| Err(StakeError::Storage("disk full".into())));
        let svc = failing_service(store);

        let err = svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap_err();
        assert!(matches!(err, StakeError::Storage(_)));
    }

    #[test]
    fn invalid_deposit_never_reaches_store() {
        let mut store = MockStore::new();
        store.expect_append_deposit().never();
        let svc = failing_service(store);
        assert!(svc.admit(&DepositRequest::new("w1", 1.0, 91.0)).is_err());
    }

    // ------------------------------------------------------------------
    // reward queries
    // ------------------------------------------------------------------

    #[test]
    fn rewards_after_ten_days() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        clock.advance_days(10);

        let summary = svc.query_rewards("w1").unwrap();
        assert_eq!(summary.amount, 1.0);
        assert_eq!(summary.days, 10);
        assert_eq!(summary.rewards, 1.0 * 0.08 * 10.0);
    }

    #[test]
    fn rewards_clamped_at_term() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        clock.advance_days(40);

        let summary = svc.query_rewards("w1").unwrap();
        assert_eq!(summary.days, 30);
        assert_eq!(summary.rewards, 1.0 * 0.08 * 30.0);
    }

    #[test]
    fn upper_tier_rewards() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w2", 10.0, 20.0)).unwrap();
        clock.advance_days(5);
        assert_eq!(svc.query_rewards("w2").unwrap().rewards, 5.0);
    }

    #[test]
    fn clock_skew_reads_as_zero_days() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        clock.advance(-3 * MILLIS_PER_DAY);
        let summary = svc.query_rewards("w1").unwrap();
        assert_eq!(summary.days, 0);
        assert_eq!(summary.rewards, 0.0);
    }

    #[test]
    fn unknown_wallet_not_found() {
        let (svc, _store, _clock) = service();
        assert_eq!(
            svc.query_rewards("unknown-wallet"),
            Err(StakeError::NotFound("unknown-wallet".into()))
        );
    }

    #[test]
    fn newest_deposit_drives_rewards() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        clock.advance_days(5);
        svc.admit(&DepositRequest::new("w1", 10.0, 20.0)).unwrap();
        clock.advance_days(2);

        let summary = svc.query_rewards("w1").unwrap();
        assert_eq!(summary.amount, 10.0);
        assert_eq!(summary.days, 2);
        assert_eq!(svc.deposits("w1").unwrap().len(), 2);
    }

    // ------------------------------------------------------------------
    // history
    // ------------------------------------------------------------------

    #[test]
    fn deposit_history_carries_term_and_projection() {
        let (svc, _store, clock) = service();
        svc.admit(&DepositRequest::new("w1", 1.0, 30.0)).unwrap();
        clock.advance_days(1);
        svc.admit(&DepositRequest::new("w1", 10.0, 20.0)).unwrap();

        let history = svc.deposits("w1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record.amount, 1.0);
        assert_eq!(history[0].term_ends_at, T0 + 30 * MILLIS_PER_DAY);
        assert_eq!(history[0].projected_reward, 1.0 * 0.08 * 30.0);
        assert_eq!(history[1].term_ends_at, T0 + MILLIS_PER_DAY + 20 * MILLIS_PER_DAY);
        assert_eq!(history[1].projected_reward, 10.0 * 0.10 * 20.0);
    }

    #[test]
    fn empty_deposit_history_not_found() {
        let (svc, _store, _clock) = service();
        assert_eq!(svc.deposits("nobody"), Err(StakeError::NotFound("nobody".into())));
    }

    #[test]
    fn deposit_history_reads_from_store() {
        let mut store = MockStore::new();
        store
            .expect_deposits_by_wallet()
            .times(1)
            .returning(|_| Err(StakeError::Storage("io".into())));
        let svc = failing_service(store);
        assert!(matches!(svc.deposits("w1"), Err(StakeError::Storage(_))));
    }

    #[test]
    fn withdrawal_history_reads_from_store() {
        let mut store = MockStore::new();
        store
            .expect_withdrawals_by_wallet()
            .times(1)
            .returning(|wallet| {
                Ok(vec![WithdrawalRequest { wallet: wallet.to_string(), requested_at: T0 }])
            });
        let svc = failing_service(store);
        let list = svc.withdrawals("w1").unwrap();
        assert_eq!(list, vec![WithdrawalRequest { wallet: "w1".into(), requested_at: T0 }]);
    }

    #[test]
    fn withdrawal_history_may_be_empty() {
        let (svc, _store, _clock) = service();
        assert!(svc.withdrawals("w1").unwrap().is_empty());
        svc.request_withdrawal(Some("w1")).unwrap();
        assert_eq!(svc.withdrawals("w1").unwrap().len(), 1);
    }

    #[test]
    fn query_storage_failure_is_distinct() {
        let mut store = MockStore::new();
        store
            .expect_find_deposit_by_wallet()
            .returning(|_| Err(StakeError::Storage("io".into())));
        let svc = failing_service(store);
        assert!(matches!(svc.query_rewards("w1"), Err(StakeError::Storage(_))));
    }

    #[test]
    fn custom_schedule_applies() {
        use satstake_core::reward::RewardTier;
        use std::ops::Bound;

        let (svc, _store, clock) = service();
        let svc = svc.with_schedule(RewardSchedule::new(vec![RewardTier {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            rate: 1.0,
        }]));
        svc.admit(&DepositRequest::new("w1", 2.0, 30.0)).unwrap();
        clock.advance_days(3);
        assert_eq!(svc.query_rewards("w1").unwrap().rewards, 6.0);
    }

    // ------------------------------------------------------------------
    // withdrawals
    // ------------------------------------------------------------------

    #[test]
    fn withdrawal_recorded_without_deposit() {
        let (svc, store, _clock) = service();
        let request = svc.request_withdrawal(Some("nobody")).unwrap();
        assert_eq!(request.requested_at, T0);
        assert_eq!(store.withdrawals_by_wallet("nobody").unwrap(), vec![request]);
    }

    #[test]
    fn duplicate_withdrawals_allowed() {
        let (svc, store, _clock) = service();
        svc.request_withdrawal(Some("w1")).unwrap();
        svc.request_withdrawal(Some("w1")).unwrap();
        assert_eq!(store.withdrawal_count(), 2);
    }

    #[test]
    fn withdrawal_requires_wallet() {
        let (svc, store, _clock) = service();
        assert_eq!(svc.request_withdrawal(None), Err(StakeError::MissingWallet));
        assert_eq!(svc.request_withdrawal(Some("")), Err(StakeError::MissingWallet));
        assert_eq!(store.withdrawal_count(), 0);
    }

    #[test]
    fn withdrawal_storage_failure_is_distinct() {
        let mut store = MockStore::new();
        store
            .expect_append_withdrawal()
            .returning(|_| Err(StakeError::Storage("io".into())));
        let svc = failing_service(store);
        assert!(matches!(svc.request_withdrawal(Some("w1")), Err(StakeError::Storage(_))));
    }

    // ------------------------------------------------------------------
    // deposit address
    // ------------------------------------------------------------------

    #[test]
    fn deposit_address_is_stable() {
        let (svc, _store, _clock) = service();
        let first = svc.deposit_address().to_string();
        for _ in 0..5 {
            assert_eq!(svc.deposit_address(), first);
        }
    }
}
