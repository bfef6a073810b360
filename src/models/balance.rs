//! Balance data models and API request/response types.
//!
//! This module defines:
//! - `UserBalance`: Database entity holding a user's current amount
//! - `ChangeBalanceRequest`, `TransferRequest`: Request bodies
//! - `BalanceResponse`: Response body for balance lookups

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a row of the `account_balance` table.
///
/// Balances are denominated in the configured base currency and must never
/// go negative (enforced by a CHECK constraint as well as the service).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    pub user_id: Uuid,
    pub balance: f64,
}

/// Request body for crediting or debiting a balance.
///
/// # JSON Example
///
/// ```json
/// {
///   "userId": "550e8400-e29b-41d4-a716-446655440000",
///   "changeAmount": -25.5
/// }
/// ```
///
/// A positive `changeAmount` is a credit, zero or negative is a debit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBalanceRequest {
    pub user_id: Uuid,
    pub change_amount: f64,
}

/// Request body for moving money between two users.
///
/// # JSON Example
///
/// ```json
/// {
///   "senderId": "550e8400-e29b-41d4-a716-446655440000",
///   "receiverId": "660e8400-e29b-41d4-a716-446655440001",
///   "amount": 100
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: f64,
}

/// Query string of `GET /api/v1/balances/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// Target currency code, e.g. `USD`. Empty or absent means no conversion.
    pub currency: Option<String>,
}

/// Response body for balance lookups: `{"balance": 100.5}`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

/// Result of a conditional debit at the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebitOutcome {
    /// The amount was subtracted.
    Applied,
    /// Nothing was written; the row holds less than the requested amount.
    InsufficientFunds { balance: f64 },
}
