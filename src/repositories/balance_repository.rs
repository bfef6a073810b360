//! PostgreSQL adapter for the `account_balance` table.

use async_trait::async_trait;
use uuid::Uuid;

use super::BalanceRepository;
use crate::{
    db::DbPool,
    error::AppError,
    models::balance::{DebitOutcome, UserBalance},
};

#[derive(Debug, Clone)]
pub struct PgBalanceRepository {
    pool: DbPool,
}

impl PgBalanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BalanceRepository for PgBalanceRepository {
    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM account_balance WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<UserBalance>, AppError> {
        let balance = sqlx::query_as::<_, UserBalance>(
            "SELECT user_id, balance FROM account_balance WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    async fn create(&self, user_id: Uuid, balance: f64) -> Result<bool, AppError> {
        // Two concurrent first credits may both see "no row"; the loser gets
        // `false` back instead of a unique violation.
        let inserted = sqlx::query(
            r#"
            INSERT INTO account_balance (user_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(balance)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    async fn add(&self, user_id: Uuid, delta: f64) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE account_balance SET balance = balance + $1 WHERE user_id = $2",
        )
        .bind(delta)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::BalanceNotFound(format!(
                "user balance of user with id {user_id} not found"
            )));
        }

        Ok(())
    }

    async fn subtract_if_sufficient(
        &self,
        user_id: Uuid,
        amount: f64,
    ) -> Result<DebitOutcome, AppError> {
        let updated: Option<f64> = sqlx::query_scalar(
            r#"
            UPDATE account_balance
            SET balance = balance - $1
            WHERE user_id = $2 AND balance >= $1
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            return Ok(DebitOutcome::Applied);
        }

        // Nothing updated: either the row is missing or it holds too little
        match self.get_by_user_id(user_id).await? {
            Some(current) => Ok(DebitOutcome::InsufficientFunds {
                balance: current.balance,
            }),
            None => Err(AppError::BalanceNotFound(format!(
                "user balance of user with id {user_id} not found"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::postgres_pool;

    #[tokio::test]
    async fn create_inserts_once() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);
        let user = Uuid::new_v4();

        assert!(!repo.exists(user).await.unwrap());
        assert!(repo.create(user, 10.0).await.unwrap());
        assert!(!repo.create(user, 99.0).await.unwrap());

        let row = repo.get_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(row.balance, 10.0);
        assert!(repo.exists(user).await.unwrap());
    }

    #[tokio::test]
    async fn add_to_missing_row_is_not_found() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);

        let err = repo.add(Uuid::new_v4(), 5.0).await.unwrap_err();

        assert!(matches!(err, AppError::BalanceNotFound(_)));
    }

    #[tokio::test]
    async fn add_accumulates() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);
        let user = Uuid::new_v4();
        repo.create(user, 10.0).await.unwrap();

        repo.add(user, 2.5).await.unwrap();
        repo.add(user, -0.5).await.unwrap();

        let row = repo.get_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(row.balance, 12.0);
    }

    #[tokio::test]
    async fn subtract_leaves_row_alone_when_short() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);
        let user = Uuid::new_v4();
        repo.create(user, 30.0).await.unwrap();

        let outcome = repo.subtract_if_sufficient(user, 50.0).await.unwrap();
        assert_eq!(outcome, DebitOutcome::InsufficientFunds { balance: 30.0 });

        let outcome = repo.subtract_if_sufficient(user, 30.0).await.unwrap();
        assert_eq!(outcome, DebitOutcome::Applied);

        let row = repo.get_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(row.balance, 0.0);
    }

    #[tokio::test]
    async fn subtract_from_missing_row_is_not_found() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);

        let err = repo
            .subtract_if_sufficient(Uuid::new_v4(), 1.0)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BalanceNotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_debits_never_overdraw() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgBalanceRepository::new(pool);
        let user = Uuid::new_v4();
        repo.create(user, 100.0).await.unwrap();

        let (a, b) = tokio::join!(
            repo.subtract_if_sufficient(user, 70.0),
            repo.subtract_if_sufficient(user, 70.0)
        );

        let applied = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(|o| *o == DebitOutcome::Applied)
            .count();
        assert_eq!(applied, 1);
        let row = repo.get_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(row.balance, 30.0);
    }
}
