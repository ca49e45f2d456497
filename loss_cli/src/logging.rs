//! Logging setup for the loss CLI
//!
//! Filtering follows `RUST_LOG`, e.g. `RUST_LOG=loss_core=debug` to trace
//! cache hits and method evaluation. Defaults to `info`.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Output goes to stderr so stdout stays
/// clean for tables and JSON.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}
