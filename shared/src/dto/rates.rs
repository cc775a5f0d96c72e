//! # Exchange Rate Data Transfer Objects
//!
//! Body of `GET /v2/exchange-rates?currency=<BASE>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response from the exchange-rate API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRatesResponse {
    pub data: ExchangeRatesData,
}

/// Rates for one base currency.
///
/// Rates are decimal strings on the wire (`"1.0987"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRatesData {
    #[serde(default)]
    pub currency: String,
    pub rates: BTreeMap<String, String>,
}

impl ExchangeRatesResponse {
    /// Single-entry stand-in used when the API cannot be reached: `{base: "1"}`.
    pub fn fallback(base: &str) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base.to_string(), "1".to_string());
        Self {
            data: ExchangeRatesData {
                currency: base.to_string(),
                rates,
            },
        }
    }
}
