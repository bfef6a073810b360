//! Persistence ports and their PostgreSQL adapters.
//!
//! The balance service only talks to the traits defined here, so the
//! business rules can be exercised against in-memory stores or mocks.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        balance::{DebitOutcome, UserBalance},
        transaction_log::{NewTransactionLog, Page, SortField, TransactionLog},
    },
};

pub mod balance_repository;
pub mod transaction_log_repository;

pub use balance_repository::PgBalanceRepository;
pub use transaction_log_repository::PgTransactionLogRepository;

/// One balance row per user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceRepository: Send + Sync {
    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError>;

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<UserBalance>, AppError>;

    /// Insert a new row. Returns `false` when a row for the user already exists.
    async fn create(&self, user_id: Uuid, balance: f64) -> Result<bool, AppError>;

    /// Apply `balance = balance + delta` in the store.
    ///
    /// Fails with [`AppError::BalanceNotFound`] when no row was updated.
    async fn add(&self, user_id: Uuid, delta: f64) -> Result<(), AppError>;

    /// Subtract `amount` only if the row holds at least that much, as one
    /// atomic statement.
    async fn subtract_if_sufficient(
        &self,
        user_id: Uuid,
        amount: f64,
    ) -> Result<DebitOutcome, AppError>;
}

/// Append-only log of balance changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionLogRepository: Send + Sync {
    /// Insert an entry and return its assigned id.
    async fn create(&self, entry: NewTransactionLog) -> Result<i32, AppError>;

    async fn list_by_user_id(
        &self,
        user_id: Uuid,
        sort: SortField,
        page: Page,
    ) -> Result<Vec<TransactionLog>, AppError>;

    async fn count_by_user_id(&self, user_id: Uuid) -> Result<i64, AppError>;
}
