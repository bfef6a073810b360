//! Balance service - core business logic for user balances.
//!
//! This service handles:
//! - Lazy creation of balance rows on the first credit
//! - Debits that never take a balance below zero
//! - Transfers between two users with a compensating credit on failure
//! - Conversion of balances into other currencies
//!
//! # Consistency Model
//!
//! There is no database transaction spanning several statements. Every
//! balance change is a single additive `UPDATE`, and a transfer is a short
//! saga: debit the sender, credit the receiver, and if the credit fails, give
//! the money back to the sender. Between the two steps a concurrent reader can
//! observe the sender debited and the receiver not yet credited.
//!
//! # Audit Ordering
//!
//! `change_balance` writes the log entry for a debit *before* the debit is
//! attempted, so a rejected debit (insufficient funds) still leaves an entry
//! behind. Every attempt is audited, including the failed ones.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::balance::DebitOutcome,
    repositories::BalanceRepository,
    services::{exchange_rate::ExchangeRateClient, transaction_log_service::TransactionLogService},
};

/// How debits guard against overdrawing a balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebitMode {
    /// One conditional `UPDATE ... WHERE balance >= amount`. Concurrent debits
    /// cannot overdraw the row.
    #[default]
    Conditional,
    /// Read the balance, compare, then issue an additive update. Two concurrent
    /// debits can both pass the check before either update lands; only the
    /// table's CHECK constraint stops the row from going negative.
    CheckThenWrite,
}

pub struct BalanceService {
    balances: Arc<dyn BalanceRepository>,
    journal: Arc<TransactionLogService>,
    rates: Arc<dyn ExchangeRateClient>,
    base_currency: String,
    debit_mode: DebitMode,
}

impl BalanceService {
    pub fn new(
        balances: Arc<dyn BalanceRepository>,
        journal: Arc<TransactionLogService>,
        rates: Arc<dyn ExchangeRateClient>,
        base_currency: impl Into<String>,
        debit_mode: DebitMode,
    ) -> Self {
        Self {
            balances,
            journal,
            rates,
            base_currency: base_currency.into(),
            debit_mode,
        }
    }

    /// Current balance of a user in the base currency.
    ///
    /// A user without a balance row has a balance of zero; that is not an error.
    pub async fn get_balance(&self, user_id: Uuid) -> Result<f64, AppError> {
        let balance = self.balances.get_by_user_id(user_id).await.inspect_err(|e| {
            tracing::error!("could not get balance of user {}: {}", user_id, e)
        })?;

        match balance {
            Some(row) => Ok(row.balance),
            None => {
                tracing::debug!("user {} has no balance row", user_id);
                Ok(0.0)
            }
        }
    }

    /// Balance converted into `currency`, rounded up to whole cents.
    pub async fn get_converted_balance(
        &self,
        user_id: Uuid,
        currency: &str,
    ) -> Result<f64, AppError> {
        let balance = self.get_balance(user_id).await?;

        let rate = self
            .rates
            .rate(&self.base_currency, currency)
            .await
            .inspect_err(|e| tracing::error!("could not get exchange rates: {}", e))?;

        Ok(ceil_to_cents(balance * rate))
    }

    /// Credit (`delta > 0`) or debit (`delta <= 0`) a user's balance.
    ///
    /// Returns `true` when the call created the user's balance row.
    ///
    /// # Errors
    ///
    /// - `BalanceNotFound`: debit of a user without a balance row
    /// - `InsufficientFunds`: debit larger than the stored balance
    /// - `Database`: store failure
    pub async fn change_balance(&self, user_id: Uuid, delta: f64) -> Result<bool, AppError> {
        let exists = self.balances.exists(user_id).await.inspect_err(|e| {
            tracing::error!("could not check if user {} exists: {}", user_id, e)
        })?;

        if delta > 0.0 {
            let commentary = format!("Added {} {}", delta, self.base_currency);

            if !exists {
                tracing::info!("creating balance of user {} with {}", user_id, delta);

                if self.balances.create(user_id, delta).await? {
                    self.journal.record(user_id, delta, commentary).await?;
                    return Ok(true);
                }
                // Lost a race with another first credit; the row exists now
                tracing::debug!("balance of user {} was created concurrently", user_id);
            }

            self.journal.record(user_id, delta, commentary).await?;
            self.balances.add(user_id, delta).await.inspect_err(|e| {
                tracing::error!("could not add balance to user {}: {}", user_id, e)
            })?;

            return Ok(false);
        }

        if !exists {
            tracing::warn!("user {} does not exist to subtract from", user_id);
            return Err(not_found(format!(
                "user balance of user with id {user_id} not found"
            )));
        }

        let amount = delta.abs();
        self.journal
            .record(
                user_id,
                amount,
                format!("Subtracted {} {}", amount, self.base_currency),
            )
            .await?;
        self.debit(user_id, amount).await?;

        Ok(false)
    }

    /// Move `amount` from `sender_id` to `receiver_id`.
    ///
    /// The caller guarantees `amount >= 0`.
    ///
    /// # Process
    ///
    /// 1. Both balance rows must exist (sender checked first)
    /// 2. Debit the sender, aborting on insufficient funds
    /// 3. Log the debit against the sender
    /// 4. Credit the receiver; on failure credit the sender back
    /// 5. Log the credit against the receiver
    ///
    /// # Errors
    ///
    /// - `BalanceNotFound`: sender or receiver has no balance row
    /// - `InsufficientFunds`: sender holds less than `amount`
    /// - `CompensationFailed`: the receiver credit failed and so did the refund
    /// - any other error of the failing step
    pub async fn apply_transaction(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        amount: f64,
    ) -> Result<(), AppError> {
        let sender_exists = self.balances.exists(sender_id).await?;
        let receiver_exists = self.balances.exists(receiver_id).await?;

        if !sender_exists {
            tracing::warn!("sender {} does not exist to subtract from", sender_id);
            return Err(not_found(format!(
                "user balance of sender {sender_id} not found"
            )));
        }
        if !receiver_exists {
            tracing::warn!("receiver {} does not exist to add to", receiver_id);
            return Err(not_found(format!(
                "user balance of receiver {receiver_id} not found"
            )));
        }

        self.debit(sender_id, amount).await.inspect_err(|e| {
            tracing::warn!(
                "could not take money from user {} for transfer to user {}: {}",
                sender_id,
                receiver_id,
                e
            )
        })?;

        self.journal
            .record(
                sender_id,
                amount,
                format!(
                    "Sent {} {} to user {}",
                    amount, self.base_currency, receiver_id
                ),
            )
            .await?;

        if let Err(cause) = self.balances.add(receiver_id, amount).await {
            tracing::warn!(
                "could not send money to user {}, returning it to user {}: {}",
                receiver_id,
                sender_id,
                cause
            );

            return match self.balances.add(sender_id, amount).await {
                Ok(()) => Err(cause),
                Err(compensation) => {
                    tracing::error!(
                        "could not return {} to user {}: {}",
                        amount,
                        sender_id,
                        compensation
                    );
                    Err(AppError::CompensationFailed {
                        cause: Box::new(cause),
                        compensation: Box::new(compensation),
                    })
                }
            };
        }

        self.journal
            .record(
                receiver_id,
                amount,
                format!(
                    "Received {} {} from user {}",
                    amount, self.base_currency, sender_id
                ),
            )
            .await?;

        Ok(())
    }

    /// Subtract `amount` (a non-negative magnitude) from an existing balance.
    async fn debit(&self, user_id: Uuid, amount: f64) -> Result<(), AppError> {
        match self.debit_mode {
            DebitMode::Conditional => {
                match self.balances.subtract_if_sufficient(user_id, amount).await? {
                    DebitOutcome::Applied => Ok(()),
                    DebitOutcome::InsufficientFunds { balance } => {
                        Err(insufficient_funds(user_id, amount, balance))
                    }
                }
            }
            DebitMode::CheckThenWrite => {
                let current = self
                    .balances
                    .get_by_user_id(user_id)
                    .await?
                    .ok_or_else(|| {
                        not_found(format!("user balance of user with id {user_id} not found"))
                    })?;

                if amount > current.balance {
                    return Err(insufficient_funds(user_id, amount, current.balance));
                }

                self.balances.add(user_id, -amount).await.inspect_err(|e| {
                    tracing::error!("could not subtract balance of user {}: {}", user_id, e)
                })
            }
        }
    }
}

/// Round up to two decimal places.
///
/// The scaled amount is first snapped to six decimals so that representation
/// error (1.1 * 100 = 110.00000000000001) does not push an exact cent value up.
pub fn ceil_to_cents(amount: f64) -> f64 {
    let cents = (amount * 100.0 * 1e6).round() / 1e6;
    cents.ceil() / 100.0
}

fn not_found(message: String) -> AppError {
    AppError::BalanceNotFound(message)
}

fn insufficient_funds(user_id: Uuid, amount: f64, balance: f64) -> AppError {
    tracing::warn!(
        "not enough funds in balance of user {}: has {}, needs {}",
        user_id,
        balance,
        amount
    );
    AppError::InsufficientFunds(format!("user {user_id} has less money than {amount}"))
}
