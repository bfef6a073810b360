//! Balance HTTP handlers.
//!
//! This module implements the balance-related API endpoints:
//! - GET /api/v1/balances/{id}[?currency=CODE] - Get (converted) balance
//! - PUT /api/v1/balances/ - Credit or debit a balance
//! - POST /api/v1/balances/send/ - Transfer money between users

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::{
    error::AppError,
    handlers::parse_user_id,
    models::balance::{BalanceQuery, BalanceResponse, ChangeBalanceRequest, TransferRequest},
    state::AppState,
};

/// Get a user's balance, optionally converted into another currency.
///
/// # Endpoint
///
/// `GET /api/v1/balances/{id}?currency=USD`
///
/// # Response (200)
///
/// ```json
/// { "balance": 100.5 }
/// ```
///
/// A user without a balance row gets `{"balance": 0}`, not a 404.
/// Converted amounts are rounded up to whole cents.
pub async fn get_balance(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let user_id = parse_user_id(&id)?;

    let balance = match query.currency.as_deref().filter(|c| !c.is_empty()) {
        Some(currency) => {
            validate_currency(currency)?;
            state
                .balances
                .get_converted_balance(user_id, currency)
                .await?
        }
        None => state.balances.get_balance(user_id).await?,
    };

    Ok(Json(BalanceResponse { balance }))
}

/// Credit or debit a balance.
///
/// # Endpoint
///
/// `PUT /api/v1/balances/`
///
/// # Request Body
///
/// ```json
/// { "userId": "550e8400-...", "changeAmount": 100 }
/// ```
///
/// # Response
///
/// - **201 Created** (empty body): the user's balance row was created
/// - **200 OK** (empty body): an existing balance was changed
pub async fn change_balance(
    State(state): State<AppState>,
    payload: Result<Json<ChangeBalanceRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload.inspect_err(|e| {
        tracing::debug!("request body in wrong format: {}", e)
    })?;

    let created = state
        .balances
        .change_balance(request.user_id, request.change_amount)
        .await
        .inspect_err(|e| {
            tracing::error!("could not change balance of user {}: {}", request.user_id, e)
        })?;

    if created {
        tracing::info!("created a new balance for user {}", request.user_id);
        Ok(StatusCode::CREATED)
    } else {
        Ok(StatusCode::OK)
    }
}

/// Transfer money from one user to another.
///
/// # Endpoint
///
/// `POST /api/v1/balances/send/`
///
/// # Request Body
///
/// ```json
/// { "senderId": "550e8400-...", "receiverId": "660e8400-...", "amount": 100 }
/// ```
///
/// # Response
///
/// - **200 OK** (empty body) on success
/// - **400** if `amount` is negative
pub async fn send_money(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::validation("wrong request model", e.body_text())
    })?;

    if request.amount < 0.0 {
        return Err(AppError::validation(
            "amount of sending money can not be negative",
            format!("amount of sending money is negative: {} < 0", request.amount),
        ));
    }

    state
        .balances
        .apply_transaction(request.sender_id, request.receiver_id, request.amount)
        .await
        .inspect_err(|e| {
            tracing::error!(
                "could not apply transaction from user {} to user {}: {}",
                request.sender_id,
                request.receiver_id,
                e
            )
        })?;

    Ok(StatusCode::OK)
}

/// Currency codes are three ASCII letters (ISO 4217 style), e.g. `USD`.
fn validate_currency(currency: &str) -> Result<(), AppError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(AppError::validation(
            "wrong currency format",
            format!("{currency:?} is not a three letter currency code"),
        ))
    }
}
