//! Transaction log models, sorting and pagination.
//!
//! The transaction log is append-only: entries are written by the balance
//! service whenever it touches a balance and are never updated afterwards.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Represents a row of the `transaction_log` table.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "userId": "550e8400-e29b-41d4-a716-446655440000",
///   "date": "2025-12-21T16:00:00Z",
///   "amount": 100.0,
///   "commentary": "Added 100 RUB"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLog {
    pub id: i32,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    /// Absolute value of the balance change
    pub amount: f64,
    pub commentary: String,
}

/// A log entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransactionLog {
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub commentary: String,
}

impl NewTransactionLog {
    /// Stamp a new entry with the current time. The amount is stored unsigned.
    pub fn now(user_id: Uuid, amount: f64, commentary: impl Into<String>) -> Self {
        Self {
            user_id,
            date: Utc::now(),
            amount: amount.abs(),
            commentary: commentary.into(),
        }
    }
}

/// Columns a log listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Date,
    Amount,
    Commentary,
}

impl SortColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Date => "date",
            SortColumn::Amount => "amount",
            SortColumn::Commentary => "commentary",
        }
    }
}

/// Ordering of a log listing, parsed from the `sortField` query parameter.
///
/// Accepts a column name optionally prefixed with `-` for descending order,
/// e.g. `date`, `-amount`. Only known columns are accepted, so the value can
/// be placed into an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortField {
    fn default() -> Self {
        Self {
            column: SortColumn::Date,
            descending: false,
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let column = match name {
            "id" => SortColumn::Id,
            "date" => SortColumn::Date,
            "amount" => SortColumn::Amount,
            "commentary" => SortColumn::Commentary,
            _ => {
                return Err(AppError::validation(
                    "unknown sortField",
                    format!("cannot sort by {raw:?}, expected one of id, date, amount, commentary"),
                ));
            }
        };

        Ok(Self { column, descending })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.descending { "DESC" } else { "ASC" };
        write!(f, "{} {}", self.column.as_sql(), direction)
    }
}

/// A zero-based page of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: i64,
    pub size: i64,
}

impl Page {
    pub const DEFAULT_SIZE: i64 = 1000;

    pub fn offset(&self) -> i64 {
        self.index.saturating_mul(self.size)
    }
}

/// Query string of `GET /api/v1/balances/transactionLogs/{id}`.
///
/// Values are kept as strings so malformed numbers surface as validation
/// errors with our own message instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
    pub sort_field: Option<String>,
}

impl LogsQuery {
    /// Convert the 1-based `pageNum` of the API into a zero-based [`Page`].
    pub fn page(&self) -> Result<Page, AppError> {
        let page_num = match non_empty(&self.page_num) {
            Some(raw) => raw.parse::<i64>().map_err(|e| {
                AppError::validation("could not convert pageNum param to int", e)
            })?,
            None => 1,
        };
        let page_size = match non_empty(&self.page_size) {
            Some(raw) => raw.parse::<i64>().map_err(|e| {
                AppError::validation("could not convert pageSize param to int", e)
            })?,
            None => Page::DEFAULT_SIZE,
        };

        if page_num < 1 {
            return Err(AppError::validation(
                "pageNum must be positive",
                format!("pageNum is {page_num}"),
            ));
        }
        if page_size < 0 {
            return Err(AppError::validation(
                "pageSize can not be negative",
                format!("pageSize is {page_size}"),
            ));
        }

        Ok(Page {
            index: page_num - 1,
            size: page_size,
        })
    }

    pub fn sort(&self) -> Result<SortField, AppError> {
        non_empty(&self.sort_field)
            .map(|raw| raw.parse::<SortField>())
            .unwrap_or_else(|| Ok(SortField::default()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
