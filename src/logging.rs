//! Tracing subscriber setup for binaries and tests embedding minidb.
//!
//! The library only emits `tracing` events. Installing a subscriber is left
//! to the caller, either directly or through these helpers when the
//! `logging` feature is enabled. Without the feature every helper is a no-op.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Installs a global subscriber at `info`, or whatever `RUST_LOG` asks for
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Installs a global subscriber at `level` (trace, debug, info, warn, error).
///
/// `RUST_LOG` takes precedence when set. Does nothing if a subscriber is
/// already installed.
///
/// # Example
/// ```rust
/// minidb::logging::init_with_level("debug");
/// ```
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Debug-level output captured by the test harness
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("minidb=debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
