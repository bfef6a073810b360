//! Business logic services.
//!
//! Services contain the business rules, separated from HTTP handlers and
//! from the stores they orchestrate.

pub mod balance_service;
pub mod exchange_rate;
pub mod transaction_log_service;

pub use balance_service::BalanceService;
pub use transaction_log_service::TransactionLogService;
