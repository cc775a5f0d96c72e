//! # PowerKeys Preview Tool
//!
//! Native companion to the browser extension. Runs the same engine against
//! saved candykeys.com pages so settings can be tried without a browser.
//!
//! - [`commands`] - `settings`, `rates` and `apply`
//! - [`store`] - settings kept in a JSON file
//! - [`logging`] - stderr tracing subscriber

pub mod commands;
pub mod logging;
pub mod store;

pub use commands::{preview, Cli};
pub use store::JsonFileStore;
