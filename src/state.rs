//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::services::{BalanceService, TransactionLogService};

#[derive(Clone)]
pub struct AppState {
    pub balances: Arc<BalanceService>,
    pub logs: Arc<TransactionLogService>,
}
