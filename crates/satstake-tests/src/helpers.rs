//! Shared test helpers for E2E and HTTP tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;

use satstake_core::clock::ManualClock;
use satstake_core::error::StakeError;
use satstake_core::store::MemoryStore;
use satstake_core::traits::RecordStore;
use satstake_core::types::{DepositRecord, WithdrawalRequest};
use satstake_node_lib::{router, ApiState, StakingService};

/// Fixed start time for every harness: 2023-11-14T22:13:20Z.
pub const T0: i64 = 1_700_000_000_000;

/// Custodial address used by every harness.
pub const TEST_DEPOSIT_ADDRESS: &str = "bc1qtestcustodyaddress";

/// A staking service on an in-memory store and a manual clock.
pub struct Harness {
    pub service: Arc<StakingService>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let service = Arc::new(StakingService::with_clock(
            store.clone(),
            clock.clone(),
            TEST_DEPOSIT_ADDRESS,
        ));
        Self { service, store, clock }
    }

    /// The HTTP router over this harness's service.
    pub fn router(&self) -> Router {
        router(ApiState::new(self.service.clone()))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A record store whose every operation fails with the same detail.
pub struct FailingStore {
    detail: String,
}

impl FailingStore {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }

    fn fail<T>(&self) -> Result<T, StakeError> {
        Err(StakeError::Storage(self.detail.clone()))
    }
}

impl RecordStore for FailingStore {
    fn find_deposit_by_wallet(&self, _wallet: &str) -> Result<Option<DepositRecord>, StakeError> {
        self.fail()
    }

    fn append_deposit(&self, _record: &DepositRecord) -> Result<(), StakeError> {
        self.fail()
    }

    fn append_withdrawal(&self, _request: &WithdrawalRequest) -> Result<(), StakeError> {
        self.fail()
    }

    fn deposits_by_wallet(&self, _wallet: &str) -> Result<Vec<DepositRecord>, StakeError> {
        self.fail()
    }

    fn withdrawals_by_wallet(&self, _wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError> {
        self.fail()
    }
}

/// Router over a service whose store always fails with `detail`.
pub fn failing_router(detail: &str) -> Router {
    let service = StakingService::with_clock(
        Arc::new(FailingStore::new(detail)),
        Arc::new(ManualClock::new(T0)),
        TEST_DEPOSIT_ADDRESS,
    );
    router(ApiState::new(Arc::new(service)))
}

/// `GET uri` with an empty body.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// `POST uri` with a JSON body.
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

/// `POST uri` with an arbitrary body labelled as JSON.
pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .expect("valid request")
}

/// `POST uri` with a body and no `Content-Type` header.
pub fn post_untyped(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body.into()))
        .expect("valid request")
}

/// Split a response into its status and decoded JSON body.
pub async fn read_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = serde_json::from_slice(&bytes).expect("JSON body");
    (status, value)
}
