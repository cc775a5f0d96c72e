//! # Exchange Rates
//!
//! Rates are always quoted against the site's base currency (EUR by default):
//! a rate of `1.10` for `USD` means one euro buys 1.10 dollars.
//!
//! - [`RateTable`] - one parsed snapshot, with the time it was fetched
//! - [`RateFetcher`] - async source of rate tables
//! - [`CoinbaseClient`] - native HTTP fetcher (feature `http-client`)
//!
//! Fetch failures are returned, never swallowed; whoever triggered the fetch
//! decides whether to notify the user or fall back.

#[cfg(feature = "http-client")]
pub mod coinbase;

#[cfg(feature = "http-client")]
pub use coinbase::CoinbaseClient;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::dto::rates::ExchangeRatesResponse;
use std::collections::BTreeMap;

/// Parsed exchange rates for one base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: BTreeMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table from explicit `(code, rate)` pairs.
    pub fn new<I, S>(base: &str, rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            base: base.to_string(),
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.into(), rate))
                .collect(),
            fetched_at: lib_utils::now_utc(),
        }
    }

    /// Parse an API response.
    ///
    /// Entries whose rate is not a positive decimal are dropped with a warning.
    pub fn from_response(base: &str, response: ExchangeRatesResponse) -> Self {
        let base = if response.data.currency.is_empty() {
            base.to_string()
        } else {
            response.data.currency
        };

        let mut rates = BTreeMap::new();
        for (code, raw) in response.data.rates {
            match raw.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    rates.insert(code, rate);
                }
                _ => tracing::warn!(currency = %code, rate = %raw, "Dropping unusable rate"),
            }
        }

        Self {
            base,
            rates,
            fetched_at: lib_utils::now_utc(),
        }
    }

    /// Single-entry table `{base: 1}` used when no rates can be fetched.
    pub fn fallback(base: &str) -> Self {
        Self::from_response(base, ExchangeRatesResponse::fallback(base))
    }

    /// Rate for `code`.
    ///
    /// # Errors
    ///
    /// [`AppError::RateNotFound`] when the table has no entry for `code`.
    pub fn rate_for(&self, code: &str) -> Result<f64> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| AppError::RateNotFound(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Currency codes in alphabetical order.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Source of exchange-rate tables.
#[async_trait(?Send)]
pub trait RateFetcher {
    /// Fetch current rates quoted against `base`.
    ///
    /// # Errors
    ///
    /// [`AppError::RateFetch`] for a non-200 answer, [`AppError::Transport`]
    /// when no answer arrived, [`AppError::Decoding`] for a malformed body.
    async fn fetch(&self, base: &str) -> Result<RateTable>;
}
