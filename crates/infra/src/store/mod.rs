//! Sale persistence.

use chrono::{DateTime, Utc};
use thiserror::Error;

use autosales_core::PaymentCode;
use autosales_sales::{Sale, SaleStatus};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemorySaleStore;
pub use postgres::PostgresSaleStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A sale with this payment code already exists.
    #[error("payment code already in use: {0}")]
    Duplicate(PaymentCode),

    #[error("no sale with payment code {0}")]
    NotFound(PaymentCode),

    /// The sale's status changed since it was read.
    #[error("sale {0} changed concurrently")]
    Stale(PaymentCode),

    /// Storage backend failure (connection, query, corrupt row).
    #[error("sale store backend error: {0}")]
    Backend(String),
}

/// Sale record storage, keyed by payment code.
#[async_trait::async_trait]
pub trait SaleStore: Send + Sync {
    /// Persist a new sale. Payment codes are unique.
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError>;

    async fn find_by_payment_code(&self, code: &PaymentCode) -> Result<Option<Sale>, StoreError>;

    /// Move the sale identified by `code` from `from` to `to`.
    ///
    /// The write only happens while the stored status still equals `from`;
    /// otherwise `Stale` is returned and nothing changes. Which transitions
    /// are legal is decided by the caller.
    async fn update_status(
        &self,
        code: &PaymentCode,
        from: SaleStatus,
        to: SaleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Sale, StoreError>;

    /// Sales in `status`, cheapest first.
    async fn list_by_status(&self, status: SaleStatus) -> Result<Vec<Sale>, StoreError>;
}
