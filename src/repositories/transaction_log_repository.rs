//! PostgreSQL adapter for the `transaction_log` table.

use async_trait::async_trait;
use uuid::Uuid;

use super::TransactionLogRepository;
use crate::{
    db::DbPool,
    error::AppError,
    models::transaction_log::{NewTransactionLog, Page, SortField, TransactionLog},
};

#[derive(Debug, Clone)]
pub struct PgTransactionLogRepository {
    pool: DbPool,
}

impl PgTransactionLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionLogRepository for PgTransactionLogRepository {
    async fn create(&self, entry: NewTransactionLog) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO transaction_log (user_id, date, amount, commentary)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.date)
        .bind(entry.amount)
        .bind(&entry.commentary)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_by_user_id(
        &self,
        user_id: Uuid,
        sort: SortField,
        page: Page,
    ) -> Result<Vec<TransactionLog>, AppError> {
        // SortField only renders whitelisted column names, so formatting it in is safe
        let query = format!(
            r#"
            SELECT id, user_id, date, amount, commentary
            FROM transaction_log
            WHERE user_id = $1
            ORDER BY {sort}, id
            LIMIT $2 OFFSET $3
            "#
        );

        let logs = sqlx::query_as::<_, TransactionLog>(&query)
            .bind(user_id)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    async fn count_by_user_id(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_log WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
