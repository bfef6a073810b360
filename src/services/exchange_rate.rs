//! Exchange rate client for the remote pricing service.
//!
//! # Wire Format
//!
//! `GET {base_url}?q=RUB_USD&compact=ultra&apiKey=...` answers with
//! `{"RUB_USD": 0.0133}`.
//!
//! No retries and no caching. A request deadline is only applied when one is
//! configured.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use url::Url;

use crate::error::AppError;

/// Source of multiplicative conversion rates between two currencies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeRateClient: Send + Sync {
    /// Rate such that `amount_in_from * rate = amount_in_to`.
    async fn rate(&self, from: &str, to: &str) -> Result<f64, AppError>;
}

/// [`ExchangeRateClient`] backed by an HTTP pricing API.
#[derive(Debug, Clone)]
pub struct HttpExchangeRateClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpExchangeRateClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Upstream(format!("invalid exchange rate url {base_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn request_url(&self, pair: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", pair)
            .append_pair("compact", "ultra")
            .append_pair("apiKey", &self.api_key);
        url
    }
}

/// Currency pair key used both in the request and the response, e.g. `RUB_USD`.
fn pair_key(from: &str, to: &str) -> String {
    format!("{}_{}", from.to_uppercase(), to.to_uppercase())
}

fn extract_rate(pair: &str, rates: &HashMap<String, f64>) -> Result<f64, AppError> {
    rates
        .get(pair)
        .copied()
        .ok_or_else(|| AppError::Upstream(format!("exchange rate for {pair} missing from response")))
}

#[async_trait]
impl ExchangeRateClient for HttpExchangeRateClient {
    async fn rate(&self, from: &str, to: &str) -> Result<f64, AppError> {
        let pair = pair_key(from, to);

        let response = self.client.get(self.request_url(&pair)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("could not get exchange rates for {}, status code: {}", pair, status);
            return Err(AppError::Upstream(format!(
                "exchange rate service responded with status {status}"
            )));
        }

        let rates: HashMap<String, f64> = response.json().await?;
        extract_rate(&pair, &rates)
    }
}
