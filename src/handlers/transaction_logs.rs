//! Transaction log HTTP handler.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{HeaderName, HeaderValue},
};

use crate::{
    error::AppError,
    handlers::parse_user_id,
    models::transaction_log::{LogsQuery, TransactionLog},
    state::AppState,
};

/// Header carrying the total number of entries the user has.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// List a user's transaction log.
///
/// # Endpoint
///
/// `GET /api/v1/balances/transactionLogs/{id}?pageNum=1&pageSize=1000&sortField=date`
///
/// - `pageNum`: 1-based page, defaults to 1
/// - `pageSize`: entries per page, defaults to 1000
/// - `sortField`: `id`, `date`, `amount` or `commentary`, `-` prefix for
///   descending, defaults to `date`
///
/// # Response (200)
///
/// Array of entries, plus an `X-Total-Count` header:
///
/// ```json
/// [
///   {
///     "id": 1,
///     "userId": "550e8400-...",
///     "date": "2025-12-21T16:00:00Z",
///     "amount": 100.0,
///     "commentary": "Added 100 RUB"
///   }
/// ]
/// ```
pub async fn list_transaction_logs(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<Vec<TransactionLog>>), AppError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let user_id = parse_user_id(&id)?;
    let page = query.page()?;
    let sort = query.sort()?;

    let logs = state.logs.list(user_id, sort, page).await?;
    let total = state.logs.count(user_id).await?;

    Ok(([(TOTAL_COUNT_HEADER, HeaderValue::from(total))], Json(logs)))
}
