//! # User Notifications
//!
//! The engine reports user-visible problems through [`Notifier`] and asks for
//! consent through [`Consent`]. Neither blocks the engine: frontends decide how
//! to present a notice (a toast in the browser, a log line in the preview tool).

use crate::error::AppError;
use async_trait::async_trait;

/// Disclosure shown before conversion is first enabled.
pub const CONVERSION_DISCLOSURE: &str = "This feature will send requests to CoinBase (api.coinbase.com) \
in order to retrieve exchange rates.
No personal data will be sent, but their privacy policy (https://coinbase.com/legal/privacy) applies.

The prices displayed may not be what you will be charged.
For instance, additional costs may be caused by your bank or the payment provider.

Do you wish to proceed?";

/// A user-visible event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Rates could not be fetched; conversion is skipped for this pass.
    RateFetchFailed { status: Option<u16>, detail: String },
    /// The chosen currency is missing from the fetched table.
    RateNotFound { currency: String },
    /// A stored currency disappeared upstream and was reset.
    CurrencyUnavailable { currency: String, fallback: String },
}

impl Notice {
    /// Map an engine error to a notice, when it warrants one.
    pub fn from_error(err: &AppError) -> Option<Self> {
        match err {
            AppError::RateFetch { status, body } => Some(Notice::RateFetchFailed {
                status: Some(*status),
                detail: body.clone(),
            }),
            AppError::Transport(detail) => Some(Notice::RateFetchFailed {
                status: None,
                detail: detail.clone(),
            }),
            AppError::RateNotFound(currency) => Some(Notice::RateNotFound {
                currency: currency.clone(),
            }),
            _ => None,
        }
    }

    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notice::RateFetchFailed {
                status: Some(status),
                detail,
            } => format!(
                "Requesting currencies from CoinBase API was unsuccessful, currency conversion is not possible\nCode: {}\nResponse: {}",
                status, detail
            ),
            Notice::RateFetchFailed { status: None, detail } => format!(
                "Requesting currencies from CoinBase API was unsuccessful, currency conversion is not possible\n{}",
                detail
            ),
            Notice::RateNotFound { currency } => {
                format!("The requested rate for {} was not found", currency)
            }
            Notice::CurrencyUnavailable { currency, fallback } => format!(
                "The currency you have selected {} is no longer available.\nPrices will be set to {} again.",
                currency, fallback
            ),
        }
    }
}

/// Sink for user-visible notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Yes/no question put to the user.
#[async_trait(?Send)]
pub trait Consent {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(?notice, "{}", notice.message());
    }
}
