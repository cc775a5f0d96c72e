//! # Price Conversion
//!
//! - [`locator`] - finds source-currency prices in page text
//! - [`converter`] - converts, re-renders and reverts them

pub mod converter;
pub mod locator;

pub use converter::{ApplyOutcome, ConversionState, ConvertedPriceRecord, PriceConverter};
pub use locator::{LocatedPrices, PriceLocator, PriceMatch};
