//! User Balance API - Main Application Entry Point
//!
//! A REST API server for per-user monetary balances: query a balance
//! (optionally converted into another currency), credit or debit it, transfer
//! money between users, and page through each user's transaction log.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Exchange Rates**: remote pricing API via reqwest
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Wire repositories and services together
//! 5. Build HTTP router and serve until SIGINT/SIGTERM

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    repositories::{PgBalanceRepository, PgTransactionLogRepository},
    services::{BalanceService, TransactionLogService, exchange_rate::HttpExchangeRateClient},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let rates = HttpExchangeRateClient::new(
        &config.exchange_rate_url,
        config.exchange_rate_api_key.clone(),
        config.exchange_rate_timeout_secs.map(Duration::from_secs),
    )?;
    let logs = Arc::new(TransactionLogService::new(Arc::new(
        PgTransactionLogRepository::new(pool.clone()),
    )));
    let balances = BalanceService::new(
        Arc::new(PgBalanceRepository::new(pool.clone())),
        logs.clone(),
        Arc::new(rates),
        config.base_currency.clone(),
        config.debit_mode,
    );
    tracing::info!(
        "Balance service ready (base currency {}, debit mode {:?})",
        config.base_currency,
        config.debit_mode
    );

    let state = AppState {
        balances: Arc::new(balances),
        logs,
    };

    let app = Router::new()
        // Readiness probe needs the pool itself
        .route("/health", get(handlers::health::health_check))
        .with_state(pool.clone())
        .merge(routes::router(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gracefully shutting down...");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, pool.close()).await.is_err() {
        tracing::warn!("database pool did not close within {:?}", grace);
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
