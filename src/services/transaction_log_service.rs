//! Transaction log service - listing and recording audit entries.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::transaction_log::{NewTransactionLog, Page, SortField, TransactionLog},
    repositories::TransactionLogRepository,
};

pub struct TransactionLogService {
    repo: Arc<dyn TransactionLogRepository>,
}

impl TransactionLogService {
    pub fn new(repo: Arc<dyn TransactionLogRepository>) -> Self {
        Self { repo }
    }

    /// List a user's entries for one zero-based page.
    pub async fn list(
        &self,
        user_id: Uuid,
        sort: SortField,
        page: Page,
    ) -> Result<Vec<TransactionLog>, AppError> {
        self.repo
            .list_by_user_id(user_id, sort, page)
            .await
            .inspect_err(|e| {
                tracing::error!("could not get transaction logs of user {}: {}", user_id, e)
            })
    }

    pub async fn count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.repo
            .count_by_user_id(user_id)
            .await
            .inspect_err(|e| {
                tracing::error!("could not count transaction logs of user {}: {}", user_id, e)
            })
    }

    /// Append an entry stamped with the current time and return its id.
    pub async fn record(
        &self,
        user_id: Uuid,
        amount: f64,
        commentary: String,
    ) -> Result<i32, AppError> {
        self.repo
            .create(NewTransactionLog::now(user_id, amount, commentary))
            .await
            .inspect_err(|e| tracing::error!("could not log info about user {}: {}", user_id, e))
    }
}
