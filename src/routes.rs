//! Route table of the balance API.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    handlers::{balances, health, transaction_logs},
    state::AppState,
};

/// Build the public API router.
///
/// The database health check needs the pool directly and is mounted by `main`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping))
        .route("/api/v1/balances/", put(balances::change_balance))
        .route("/api/v1/balances/send/", post(balances::send_money))
        .route("/api/v1/balances/{id}", get(balances::get_balance))
        .route(
            "/api/v1/balances/transactionLogs/{id}",
            get(transaction_logs::list_transaction_logs),
        )
        .with_state(state)
}
