//! # Core Library
//!
//! The PowerKeys engine: everything the extension does to a candykeys.com page,
//! independent of the browser.
//!
//! ## Modules
//!
//! - [`model`] - the [`Page`](model::page::Page) abstraction with an arena
//!   [`Document`](model::page::Document), and the settings store
//! - [`price`] - locating, converting and reverting prices
//! - [`rates`] - exchange-rate tables and fetchers
//! - [`decorators`] - visibility, sorting, theme and checkout warning
//! - [`content`] - the content script's apply loop
//! - [`popup`] - the options popup's controller
//! - [`notify`] - user notices and consent
//!
//! ## Features
//!
//! - `http-client` (default) - [`rates::CoinbaseClient`] over `reqwest`
//! - `html` (default) - [`Document::parse_html`](model::page::Document::parse_html)
//!   via `scraper`
//! - `test-utils` - `test_utils` doubles for downstream test suites

pub mod config;
pub mod content;
pub mod decorators;
pub mod error;
pub mod model;
pub mod notify;
pub mod popup;
pub mod price;
pub mod rates;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types
pub use config::{Config, SiteProfile};
pub use content::{ApplyReport, ContentScript, ConversionOutcome};
pub use error::{AppError, Result};
pub use popup::{PopupController, PopupView, ToggleOutcome};
