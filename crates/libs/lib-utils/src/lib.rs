//! # Utilities Library
//!
//! Small helpers shared by the engine and the preview tool: environment
//! variables and timestamps.

pub mod envs;
pub mod time;

// Re-export commonly used functions
pub use envs::{get_env, get_env_or, get_env_parse};
pub use time::{format_time, now_utc};
