//! Client for the external inventory service.

use thiserror::Error;

use autosales_inventory::{Vehicle, VehicleId};

pub mod http;

pub use http::HttpInventoryClient;

/// Inventory call failure.
///
/// Only `NotFound` carries business meaning; every other variant is an
/// upstream failure callers treat uniformly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("vehicle not found in inventory")]
    NotFound,

    #[error("inventory request failed: {0}")]
    Transport(String),

    #[error("inventory responded with status {0}")]
    Status(u16),

    #[error("inventory response could not be decoded: {0}")]
    Decode(String),

    #[error("cannot build inventory url: {0}")]
    InvalidUrl(String),
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::NotFound)
    }
}

/// Operations this service needs from the inventory.
#[async_trait::async_trait]
pub trait InventoryClient: Send + Sync {
    /// `GET /vehicles/{id}`.
    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, InventoryError>;

    /// `GET /vehicles?status=AVAILABLE`. The filter is applied upstream.
    async fn list_available_vehicles(&self) -> Result<Vec<Vehicle>, InventoryError>;

    /// `PATCH /vehicles/{id}/status` with `{"status":"SOLD"}`.
    async fn mark_sold(&self, id: &VehicleId) -> Result<(), InventoryError>;
}
