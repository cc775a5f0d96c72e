//! Stderr logging initialization

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "powerkeys=info,lib_core=info,warn";

/// Install the global subscriber.
///
/// Events go to stderr so `apply` can stream HTML on stdout. `verbose` raises
/// the crate filters to `debug`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "powerkeys=debug,lib_core=debug,warn"
    } else {
        DEFAULT_FILTER
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();

    tracing::debug!(verbose, "Logging initialized");
}
