//! Axum router and HTTP handlers.
//!
//! Every error body is `{"error": "<message>"}`. Validation messages come
//! straight from the error's `Display`; storage failures are logged and
//! replaced with a fixed per-route message.
//!
//! Store access is synchronous, so every service call runs on tokio's
//! blocking pool.

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use satstake_core::error::StakeError;
use satstake_core::types::DepositRequest;

use crate::service::StakingService;

const DEPOSIT_STORAGE_MESSAGE: &str = "Database error";
const REWARDS_STORAGE_MESSAGE: &str = "Could not calculate rewards";
const WITHDRAW_STORAGE_MESSAGE: &str = "Failed to store withdrawal request";
const DEPOSITS_STORAGE_MESSAGE: &str = "Could not load deposits";
const WITHDRAWALS_STORAGE_MESSAGE: &str = "Could not load withdrawals";

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<StakingService>,
}

impl ApiState {
    pub fn new(service: Arc<StakingService>) -> Self {
        Self { service }
    }
}

// ── Error helper ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    /// Body was not valid JSON of the expected shape.
    InvalidJson(JsonRejection),
    /// The service refused or failed the operation.
    Stake {
        source: StakeError,
        /// Message shown instead of storage failure detail.
        storage_message: &'static str,
    },
}

impl ApiError {
    fn stake(storage_message: &'static str) -> impl FnOnce(StakeError) -> Self {
        move |source| Self::Stake { source, storage_message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Stake { source, .. } => match source {
                StakeError::Validation(_) | StakeError::MissingWallet => StatusCode::BAD_REQUEST,
                StakeError::NotFound(_) => StatusCode::NOT_FOUND,
                StakeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::InvalidJson(rejection) => {
                warn!(error = %rejection.body_text(), "rejected malformed request body");
                "Invalid JSON".to_string()
            }
            Self::Stake { source: StakeError::Storage(detail), storage_message } => {
                error!(%detail, "storage failure");
                storage_message.to_string()
            }
            Self::Stake { source, .. } => source.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

/// Unwrap a JSON body. A request without a JSON content type reads as an
/// empty body, so validation reports which fields are missing.
fn json_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Run a service call on the blocking pool.
async fn run_blocking<T, F>(state: &ApiState, call: F) -> Result<T, StakeError>
where
    T: Send + 'static,
    F: FnOnce(&StakingService) -> Result<T, StakeError> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| StakeError::Storage(format!("service task failed: {e}")))?
}

// ── Router ───────────────────────────────────────────────────────────────────

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/deposit-address", get(deposit_address))
        .route("/deposit", post(create_deposit))
        .route("/rewards/:wallet", get(rewards))
        .route("/withdraw", post(withdraw))
        .route("/deposits/:wallet", get(deposit_history))
        .route("/withdrawals/:wallet", get(withdrawal_history))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve `router(state)` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "satstake" }))
}

/// `GET /deposit-address`: the custodial receive address.
async fn deposit_address(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({ "address": state.service.deposit_address() }))
}

/// `POST /deposit`: admit and record a deposit.
async fn create_deposit(
    State(state): State<ApiState>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> ApiResult {
    let req: DepositRequest = json_body(payload)?;
    let receipt = run_blocking(&state, move |service| service.admit(&req))
        .await
        .map_err(ApiError::stake(DEPOSIT_STORAGE_MESSAGE))?;

    Ok(Json(json!({
        "message": "Deposit recorded",
        "forwardTo": receipt.forward_to,
        "createdAt": receipt.record.created_at,
    })))
}

/// `GET /rewards/:wallet`: accrued reward for the wallet's deposit.
async fn rewards(State(state): State<ApiState>, Path(wallet): Path<String>) -> ApiResult {
    let summary = run_blocking(&state, move |service| service.query_rewards(&wallet))
        .await
        .map_err(ApiError::stake(REWARDS_STORAGE_MESSAGE))?;

    Ok(Json(json!({
        "amount": summary.amount,
        "days": summary.days,
        "rewards": summary.rewards,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WithdrawBody {
    wallet: Option<String>,
}

/// `POST /withdraw`: record a withdrawal request.
async fn withdraw(
    State(state): State<ApiState>,
    payload: Result<Json<WithdrawBody>, JsonRejection>,
) -> ApiResult {
    let body: WithdrawBody = json_body(payload)?;
    run_blocking(&state, move |service| service.request_withdrawal(body.wallet.as_deref()))
        .await
        .map_err(ApiError::stake(WITHDRAW_STORAGE_MESSAGE))?;

    Ok(Json(json!({ "message": "Withdrawal request received" })))
}

/// `GET /deposits/:wallet`: every deposit of the wallet, oldest first.
async fn deposit_history(State(state): State<ApiState>, Path(wallet): Path<String>) -> ApiResult {
    let lookup = wallet.clone();
    let deposits = run_blocking(&state, move |service| service.deposits(&lookup))
        .await
        .map_err(ApiError::stake(DEPOSITS_STORAGE_MESSAGE))?;

    Ok(Json(json!({ "wallet": wallet, "deposits": deposits })))
}

/// `GET /withdrawals/:wallet`: withdrawal requests filed for the wallet.
async fn withdrawal_history(State(state): State<ApiState>, Path(wallet): Path<String>) -> ApiResult {
    let lookup = wallet.clone();
    let withdrawals = run_blocking(&state, move |service| service.withdrawals(&lookup))
        .await
        .map_err(ApiError::stake(WITHDRAWALS_STORAGE_MESSAGE))?;

    Ok(Json(json!({ "wallet": wallet, "withdrawals": withdrawals })))
}
