//! # Centralized Error Handling
//!
//! This module defines the engine-wide error type [`AppError`] used by the rate
//! fetcher, the settings store, the page model and both frontends. It follows the
//! `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Exchange-rate errors** - surfaced to the user as a notice
//!    - [`RateFetch`](AppError::RateFetch) - non-200 response from the rate API
//!    - [`Transport`](AppError::Transport) - the request never produced a response
//!    - [`RateNotFound`](AppError::RateNotFound) - the table lacks the chosen currency
//!
//! 2. **Infrastructure errors** - logged, never shown verbatim
//!    - [`Config`](AppError::Config), [`Storage`](AppError::Storage),
//!      [`Decoding`](AppError::Decoding)
//!
//! 3. **Page errors**
//!    - [`Selector`](AppError::Selector) - a site-profile selector failed to parse
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn require_currency(code: &str) -> Result<&str> {
//!     if code.trim().is_empty() {
//!         return Err(AppError::RateNotFound(code.to_string()));
//!     }
//!     Ok(code)
//! }
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Engine-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid environment or site-profile configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The exchange-rate endpoint answered with something other than 200.
    #[error("Exchange-rate request failed with status {status}: {body}")]
    RateFetch { status: u16, body: String },

    /// Network failure before any HTTP status was received.
    #[error("Exchange-rate request failed: {0}")]
    Transport(String),

    /// The fetched rate table has no entry for the requested currency.
    #[error("Rate for currency {0} not found")]
    RateNotFound(String),

    /// Malformed JSON from the store or the rate API.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Settings store read or write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A CSS selector could not be parsed.
    #[error("Invalid selector: {0}")]
    Selector(String),
}

impl AppError {
    /// Whether this error came from fetching exchange rates.
    pub fn is_rate_fetch(&self) -> bool {
        matches!(self, AppError::RateFetch { .. } | AppError::Transport(_))
    }

    /// HTTP status of a failed rate request, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::RateFetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Infrastructure errors collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::RateFetch { .. } | AppError::Transport(_) => {
                "Exchange rates are currently unavailable".to_string()
            }
            AppError::RateNotFound(code) => format!("Rate for {} not found", code),
            AppError::Selector(msg) => msg.clone(),
            AppError::Config(_) | AppError::Decoding(_) | AppError::Storage(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(format!("JSON error: {}", err))
    }
}

/// Convert environment lookup failures to `AppError`.
impl From<lib_utils::envs::Error> for AppError {
    fn from(err: lib_utils::envs::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
