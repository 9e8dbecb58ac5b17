//! Tracing/logging setup, initialized once at the process edge.
//!
//! Components never hold a logger; they emit `tracing` events and this crate
//! decides where those events go. Never log raw credentials — fingerprints
//! only.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing/logging.
///
/// JSON output, filterable via `RUST_LOG` (default `info`). Safe to call
/// multiple times; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
