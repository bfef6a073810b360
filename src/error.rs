//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: Malformed ids, pagination values, request bodies
/// - **Balance Errors**: Missing balance rows, insufficient funds
/// - **Database Errors**: Any sqlx::Error from store operations
/// - **Upstream Errors**: Failures talking to the exchange rate service
/// - **Compensation Errors**: A transfer whose undo step also failed
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request with both fields in the body.
    #[error("{message}: {errors}")]
    Validation { message: String, errors: String },

    /// The operation requires a balance row that does not exist.
    #[error("{0}")]
    BalanceNotFound(String),

    /// A debit exceeds the stored balance.
    #[error("{0}")]
    InsufficientFunds(String),

    /// Database operation failed (e.g., connection error, query error).
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// The exchange rate service could not be reached or answered badly.
    #[error("{0}")]
    Upstream(String),

    /// Crediting the receiver failed and returning the money to the sender failed too.
    ///
    /// The sender has been debited without a matching credit anywhere.
    #[error("{cause}; returning funds to the sender failed: {compensation}")]
    CompensationFailed {
        cause: Box<AppError>,
        compensation: Box<AppError>,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>, errors: impl ToString) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: errors.to_string(),
        }
    }

    /// HTTP status this error is reported with.
    ///
    /// Only validation failures are client errors. A missing balance row is
    /// reported as 500, matching what existing clients of the API expect.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BalanceNotFound(_)
            | AppError::InsufficientFunds(_)
            | AppError::Database(_)
            | AppError::Upstream(_)
            | AppError::CompensationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("wrong request format", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("wrong query format", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("wrong path format", rejection.body_text())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(format!("exchange rate request failed: {err}"))
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// Validation errors:
/// ```json
/// { "message": "wrong user id format", "errors": "invalid character..." }
/// ```
///
/// Everything else:
/// ```json
/// { "message": "user 550e8400-... has less money than 100" }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation { message, errors } => Json(json!({
                "message": message,
                "errors": errors,
            })),
            other => Json(json!({ "message": other.to_string() })),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_carries_both_fields() {
        let response = AppError::validation("wrong user id format", "bad uuid").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "wrong user id format");
        assert_eq!(body["errors"], "bad uuid");
    }

    #[tokio::test]
    async fn service_errors_map_to_internal_error_with_message() {
        let response = AppError::InsufficientFunds("not enough".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "not enough");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn query_rejection_becomes_json_validation_error() {
        use axum::{extract::Query, http::Uri};

        #[derive(Debug, serde::Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            page: Option<String>,
        }

        let uri: Uri = "/logs?page=1&page=2".parse().unwrap();
        let rejection = Query::<Paging>::try_from_uri(&uri).unwrap_err();

        let response = AppError::from(rejection).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "wrong query format");
        assert!(body["errors"].is_string());
    }

    #[test]
    fn balance_not_found_stays_a_server_error() {
        let err = AppError::BalanceNotFound("missing".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn compensation_failure_mentions_both_causes() {
        let err = AppError::CompensationFailed {
            cause: Box::new(AppError::Upstream("receiver".to_string())),
            compensation: Box::new(AppError::Upstream("sender".to_string())),
        };

        let message = err.to_string();
        assert!(message.contains("receiver"));
        assert!(message.contains("sender"));
    }
}
