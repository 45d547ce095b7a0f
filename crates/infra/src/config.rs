//! Configuration loading and representation.
//!
//! Everything is read from the environment once, at startup, and handed to
//! the services that need it. The inventory address is optional on purpose:
//! without it the service still starts, and the operations that need the
//! inventory report `ConfigurationMissing` per request.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const INVENTORY_BASE_URL: &str = "INVENTORY_BASE_URL";
pub const INVENTORY_TIMEOUT_MS: &str = "INVENTORY_TIMEOUT_MS";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3002";
const DEFAULT_INVENTORY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{var} must be a positive integer (got {value:?})")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} is not a valid socket address (got {value:?})")]
    InvalidAddr { var: &'static str, value: String },
}

/// Connection settings for the external inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub base_url: Url,
    /// Upper bound for a single inventory call (connect + response).
    pub timeout: Duration,
}

impl InventoryConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_INVENTORY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesConfig {
    /// `None` when `INVENTORY_BASE_URL` is unset or blank.
    pub inventory: Option<InventoryConfig>,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
}

impl SalesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match read(INVENTORY_TIMEOUT_MS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: INVENTORY_TIMEOUT_MS,
                        value: raw,
                    });
                }
            },
            None => DEFAULT_INVENTORY_TIMEOUT,
        };

        let inventory = match read(INVENTORY_BASE_URL) {
            Some(raw) => {
                let base_url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
                    var: INVENTORY_BASE_URL,
                    reason: e.to_string(),
                })?;
                if base_url.cannot_be_a_base() {
                    return Err(ConfigError::InvalidUrl {
                        var: INVENTORY_BASE_URL,
                        reason: "not a hierarchical URL".to_string(),
                    });
                }
                Some(InventoryConfig::new(base_url).with_timeout(timeout))
            }
            None => None,
        };

        let bind_raw = read(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr {
                var: BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        Ok(Self {
            inventory,
            database_url: read(DATABASE_URL),
            bind_addr,
        })
    }
}
