//! Tracing subscriber initialization.
//!
//! `RUST_LOG` selects the filter (default `info`). `LOG_FORMAT=text` switches
//! from JSON lines to human-readable output for local runs.

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    /// Unknown or missing values fall back to JSON.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "text" || v == "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let format = LogFormat::parse(std::env::var(LOG_FORMAT).ok().as_deref());
    init_with(format);
}

pub fn init_with(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    // try_init fails when a subscriber is already set; that is the no-op case.
    let _ = match format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Text => builder.with_target(true).try_init(),
    };
}
