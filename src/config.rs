//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct,
//! which is then handed to the services at construction time.

use serde::Deserialize;

use crate::services::balance_service::DebitMode;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `BASE_CURRENCY` (optional): currency balances are stored in, defaults to RUB
/// - `EXCHANGE_RATE_URL` (optional): conversion endpoint of the pricing service
/// - `EXCHANGE_RATE_API_KEY` (optional): API key sent to the pricing service
/// - `EXCHANGE_RATE_TIMEOUT_SECS` (optional): request deadline, unset means none
/// - `DEBIT_MODE` (optional): `conditional` (default) or `check_then_write`
/// - `SHUTDOWN_TIMEOUT_SECS` (optional): grace period on shutdown, defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    #[serde(default = "default_exchange_rate_url")]
    pub exchange_rate_url: String,

    #[serde(default)]
    pub exchange_rate_api_key: String,

    pub exchange_rate_timeout_secs: Option<u64>,

    #[serde(default)]
    pub debit_mode: DebitMode,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_base_currency() -> String {
    "RUB".to_string()
}

fn default_exchange_rate_url() -> String {
    "https://free.currconv.com/api/v7/convert".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        Self::from_iter(std::env::vars())
    }

    /// Deserialize configuration from an explicit set of variables.
    ///
    /// Field names are matched case-insensitively: `database_url` <- `DATABASE_URL`.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
