//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the extension frontends (content
//! script, popup, native preview tool) and the engine in `lib-core`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::settings`]**: The user preferences persisted in the settings store
//!   - **[`dto::rates`]**: The exchange-rate API response body
//! - **[`utils`]**: Shared amount formatting and parsing
//!   - **[`utils::format_amount`]**: Render an amount with a decimal comma
//!   - **[`utils::parse_amount`]**: Read a decimal-comma amount back
//!
//! ## Wire Format
//!
//! Settings serialize with **camelCase** keys (`outOfStock`, `enableConversion`, ...)
//! because the same keys are shared with `chrome.storage.local`. Exchange-rate
//! bodies follow the upstream API verbatim: rates arrive as strings.
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::settings::Settings;
//! use shared::utils::format_price;
//!
//! let settings = Settings::install_defaults();
//! assert_eq!(settings.currency, "EUR");
//! assert_eq!(format_price(14.289, "USD"), "14,29 USD");
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
pub use dto::*;
pub use utils::*;
