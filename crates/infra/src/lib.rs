//! Infrastructure layer: configuration, inventory client, sale storage, and
//! the application services that coordinate them.

pub mod config;
pub mod inventory;
pub mod lifecycle;
pub mod query;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, InventoryConfig, SalesConfig};
pub use inventory::{HttpInventoryClient, InventoryClient, InventoryError};
pub use lifecycle::{SaleError, SaleLifecycle};
pub use query::SalesQuery;
pub use store::{InMemorySaleStore, PostgresSaleStore, SaleStore, StoreError};
