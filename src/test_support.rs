//! In-memory stores for exercising services and handlers without PostgreSQL.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::{
        balance::{DebitOutcome, UserBalance},
        transaction_log::{NewTransactionLog, Page, SortColumn, SortField, TransactionLog},
    },
    repositories::{BalanceRepository, TransactionLogRepository},
};

#[derive(Default)]
pub struct InMemoryBalances {
    rows: Mutex<HashMap<Uuid, f64>>,
    failing_adds: Mutex<HashSet<Uuid>>,
}

impl InMemoryBalances {
    pub fn insert(&self, user_id: Uuid, balance: f64) {
        self.rows.lock().unwrap().insert(user_id, balance);
    }

    pub fn balance_of(&self, user_id: Uuid) -> Option<f64> {
        self.rows.lock().unwrap().get(&user_id).copied()
    }

    /// Make every later `add` for this user fail with a database error.
    pub fn fail_adds_for(&self, user_id: Uuid) {
        self.failing_adds.lock().unwrap().insert(user_id);
    }
}

#[async_trait]
impl BalanceRepository for InMemoryBalances {
    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.rows.lock().unwrap().contains_key(&user_id))
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<UserBalance>, AppError> {
        Ok(self
            .balance_of(user_id)
            .map(|balance| UserBalance { user_id, balance }))
    }

    async fn create(&self, user_id: Uuid, balance: f64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&user_id) {
            return Ok(false);
        }
        rows.insert(user_id, balance);
        Ok(true)
    }

    async fn add(&self, user_id: Uuid, delta: f64) -> Result<(), AppError> {
        if self.failing_adds.lock().unwrap().contains(&user_id) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        let balance = rows.get_mut(&user_id).ok_or_else(|| {
            AppError::BalanceNotFound(format!("user balance of user with id {user_id} not found"))
        })?;
        *balance += delta;
        Ok(())
    }

    async fn subtract_if_sufficient(
        &self,
        user_id: Uuid,
        amount: f64,
    ) -> Result<DebitOutcome, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let balance = rows.get_mut(&user_id).ok_or_else(|| {
            AppError::BalanceNotFound(format!("user balance of user with id {user_id} not found"))
        })?;

        if *balance < amount {
            return Ok(DebitOutcome::InsufficientFunds { balance: *balance });
        }
        *balance -= amount;
        Ok(DebitOutcome::Applied)
    }
}

#[derive(Default)]
pub struct InMemoryLogs {
    entries: Mutex<Vec<TransactionLog>>,
}

impl InMemoryLogs {
    /// Entries of one user in insertion order.
    pub fn entries_for(&self, user_id: Uuid) -> Vec<TransactionLog> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionLogRepository for InMemoryLogs {
    async fn create(&self, entry: NewTransactionLog) -> Result<i32, AppError> {
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as i32 + 1;
        entries.push(TransactionLog {
            id,
            user_id: entry.user_id,
            date: entry.date,
            amount: entry.amount,
            commentary: entry.commentary,
        });
        Ok(id)
    }

    async fn list_by_user_id(
        &self,
        user_id: Uuid,
        sort: SortField,
        page: Page,
    ) -> Result<Vec<TransactionLog>, AppError> {
        let mut entries = self.entries_for(user_id);
        entries.sort_by(|a, b| {
            let ordering = match sort.column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::Date => a.date.cmp(&b.date),
                SortColumn::Amount => a.amount.total_cmp(&b.amount),
                SortColumn::Commentary => a.commentary.cmp(&b.commentary),
            };
            let ordering = if sort.descending {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then(a.id.cmp(&b.id))
        });

        Ok(entries
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn count_by_user_id(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(self.entries_for(user_id).len() as i64)
    }
}

/// Migrated pool on the database named by `DATABASE_URL`.
///
/// Returns `None` when the variable is unset; adapter tests then skip.
/// Every test works on fresh user ids, so a shared database is fine.
pub async fn postgres_pool() -> Option<DbPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL adapter test");
        return None;
    };

    let pool = db::create_pool(&url, 2).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    Some(pool)
}
