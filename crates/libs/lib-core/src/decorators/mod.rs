//! # Page Decorators
//!
//! Everything the content script does to a page apart from price conversion.
//! Each decorator is idempotent and a missing page element is a silent no-op.
//!
//! - [`visibility`] - hide out-of-stock and preorder items
//! - [`sort`] - reorder the product list
//! - [`theme`] - dark stylesheet and image borders
//! - [`checkout`] - warning banner while conversion is on

pub mod checkout;
pub mod sort;
pub mod theme;
pub mod visibility;

pub use checkout::{CheckoutWarning, CHECKOUT_WARNING, DISABLE_CONVERSION_ACTION};
pub use sort::sort_products;
pub use theme::{apply_borders, apply_dark_mode, border_rule};
pub use visibility::apply_visibility;
