//! # Coinbase Exchange-Rate Client
//!
//! Native client for the public Coinbase exchange-rate endpoint:
//!
//! ```text
//! GET https://api.coinbase.com/v2/exchange-rates?currency=EUR
//! Content-Type: application/json
//! ```
//!
//! No authentication is required. Only a `200 OK` answer counts as success;
//! any other status surfaces as [`AppError::RateFetch`] with the response body.
//!
//! ## Example
//! ```no_run
//! use lib_core::config::Config;
//! use lib_core::rates::{CoinbaseClient, RateFetcher};
//!
//! # async fn example() -> lib_core::Result<()> {
//! let client = CoinbaseClient::new(&Config::default())?;
//! let table = client.fetch("EUR").await?;
//! println!("1 EUR = {} USD", table.rate_for("USD")?);
//! # Ok(())
//! # }
//! ```

use super::{RateFetcher, RateTable};
use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use shared::dto::rates::ExchangeRatesResponse;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the exchange-rate API.
pub struct CoinbaseClient {
    http: Client,
    rates_url: String,
}

impl CoinbaseClient {
    /// Create a client for `config.rates_url` with the configured timeout.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] when the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            rates_url: config.rates_url.clone(),
        })
    }

    pub fn rates_url(&self) -> &str {
        &self.rates_url
    }
}

#[async_trait(?Send)]
impl RateFetcher for CoinbaseClient {
    #[tracing::instrument(skip(self), fields(url = %self.rates_url))]
    async fn fetch(&self, base: &str) -> Result<RateTable> {
        debug!("Requesting exchange rates");

        let response = self
            .http
            .get(&self.rates_url)
            .query(&[("currency", base)])
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("Exchange-rate request failed: {}", e);
                AppError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Exchange-rate API returned an error");
            return Err(AppError::RateFetch {
                status: status.as_u16(),
                body,
            });
        }

        let body: ExchangeRatesResponse = response.json().await.map_err(|e| {
            warn!("Exchange-rate response parse failed: {}", e);
            AppError::Decoding(format!("Exchange-rate response: {}", e))
        })?;

        let table = RateTable::from_response(base, body);
        debug!(currencies = table.len(), "Exchange rates received");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_url() {
        let config = Config {
            rates_url: "http://localhost:9/v2/exchange-rates".to_string(),
            ..Config::default()
        };
        let client = CoinbaseClient::new(&config).unwrap();
        assert_eq!(client.rates_url(), "http://localhost:9/v2/exchange-rates");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = Config {
            rates_url: "http://127.0.0.1:9/v2/exchange-rates".to_string(),
            http_timeout_secs: 2,
            ..Config::default()
        };
        let client = CoinbaseClient::new(&config).unwrap();
        let err = client.fetch("EUR").await.unwrap_err();
        assert!(err.is_rate_fetch());
    }
}
