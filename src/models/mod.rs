//! Data models representing database entities and API payloads.

/// User balance rows and balance request/response bodies
pub mod balance;
/// Transaction log entries, sorting and paging
pub mod transaction_log;
