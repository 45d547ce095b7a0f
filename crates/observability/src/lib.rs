//! Process-wide tracing/logging setup.

/// Initialize process-wide logging from the environment.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (filter, output format).
pub mod tracing;

pub use tracing::LogFormat;
