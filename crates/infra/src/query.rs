//! Read side: vehicles open for sale and vehicles already sold.

use std::sync::Arc;

use tracing::warn;

use autosales_inventory::{Vehicle, sort_by_price};
use autosales_sales::{Sale, SaleStatus};

use crate::inventory::InventoryClient;
use crate::lifecycle::SaleError;
use crate::store::SaleStore;

#[derive(Clone)]
pub struct SalesQuery {
    inventory: Option<Arc<dyn InventoryClient>>,
    store: Arc<dyn SaleStore>,
}

impl SalesQuery {
    pub fn new(inventory: Option<Arc<dyn InventoryClient>>, store: Arc<dyn SaleStore>) -> Self {
        Self { inventory, store }
    }

    /// Vehicles the inventory reports as AVAILABLE, cheapest first.
    ///
    /// Vehicles are passed through as the inventory returned them; only the
    /// order changes.
    pub async fn list_available_for_sale(&self) -> Result<Vec<Vehicle>, SaleError> {
        let Some(inventory) = self.inventory.as_ref() else {
            warn!("INVENTORY_BASE_URL is not configured");
            return Err(SaleError::ConfigurationMissing);
        };

        let mut vehicles = inventory.list_available_vehicles().await.map_err(|e| {
            warn!(error = %e, "failed to list available vehicles");
            SaleError::UpstreamUnavailable(e.to_string())
        })?;
        sort_by_price(&mut vehicles);
        Ok(vehicles)
    }

    /// Paid sales, cheapest first.
    pub async fn list_sold(&self) -> Result<Vec<Sale>, SaleError> {
        Ok(self.store.list_by_status(SaleStatus::Paid).await?)
    }
}
