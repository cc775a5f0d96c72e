//! Exchange rates over the browser's `fetch`.

use async_trait::async_trait;
use gloo_net::http::Request;
use lib_core::config::Config;
use lib_core::rates::{RateFetcher, RateTable};
use lib_core::{AppError, Result};
use shared::dto::rates::ExchangeRatesResponse;

/// Rate fetcher for the wasm build.
pub struct GlooRateFetcher {
    rates_url: String,
}

impl GlooRateFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            rates_url: config.rates_url.clone(),
        }
    }
}

#[async_trait(?Send)]
impl RateFetcher for GlooRateFetcher {
    #[tracing::instrument(skip(self), fields(url = %self.rates_url))]
    async fn fetch(&self, base: &str) -> Result<RateTable> {
        let response = Request::get(&self.rates_url)
            .query([("currency", base)])
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Exchange-rate request failed: {}", e);
                AppError::Transport(e.to_string())
            })?;

        if response.status() != 200 {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Exchange-rate API returned an error");
            return Err(AppError::RateFetch { status, body });
        }

        let body: ExchangeRatesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("Exchange-rate response: {}", e)))?;
        Ok(RateTable::from_response(base, body))
    }
}
