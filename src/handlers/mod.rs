//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, query string)
//! 2. Validates it and calls into a service
//! 3. Returns HTTP response (JSON, status code)

use uuid::Uuid;

use crate::error::AppError;

/// Balance lookup, change and transfer endpoints
pub mod balances;
/// Liveness and readiness probes
pub mod health;
/// Transaction log listing
pub mod transaction_logs;

/// Parse a user id path segment; malformed ids are validation errors.
pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| {
        tracing::debug!("could not parse user id {}: {}", raw, e);
        AppError::validation("wrong user id format", e)
    })
}
