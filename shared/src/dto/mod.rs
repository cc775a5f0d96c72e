//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged between the settings store, the popup, the content
//! script and the exchange-rate API.
//!
//! ## Module Organization
//!
//! - [`settings`] - User preferences and their install-time defaults
//! - [`rates`] - Exchange-rate API response body
//!
//! ## Example JSON
//!
//! ### Settings (as stored)
//!
//! ```text
//! {
//!   "outOfStock": false,
//!   "preorder": false,
//!   "frontPage": false,
//!   "enableSort": false,
//!   "sortBy": "price",
//!   "sortOrder": "ascending",
//!   "darkMode": false,
//!   "enableBorder": false,
//!   "borderStyle": "solid",
//!   "borderWidth": 5,
//!   "borderColor": "red",
//!   "enableConversion": false,
//!   "currency": "EUR"
//! }
//! ```
//!
//! ### Exchange rates
//!
//! ```text
//! GET https://api.coinbase.com/v2/exchange-rates?currency=EUR
//!
//! {
//!   "data": {
//!     "currency": "EUR",
//!     "rates": { "USD": "1.10", "GBP": "0.86", "EUR": "1.0" }
//!   }
//! }
//! ```

pub mod rates;
pub mod settings;

pub use rates::*;
pub use settings::*;
