//! # Model Layer
//!
//! - [`page`] - what the engine can see and change on a page
//! - [`store`] - where settings live

pub mod page;
pub mod store;
