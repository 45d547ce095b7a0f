use std::sync::Arc;

use anyhow::Context;

use autosales_infra::{
    HttpInventoryClient, InMemorySaleStore, InventoryClient, PostgresSaleStore, SaleLifecycle,
    SaleStore, SalesConfig, SalesQuery,
};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub lifecycle: SaleLifecycle,
    pub query: SalesQuery,
}

impl AppServices {
    pub fn new(inventory: Option<Arc<dyn InventoryClient>>, store: Arc<dyn SaleStore>) -> Self {
        Self {
            lifecycle: SaleLifecycle::new(inventory.clone(), store.clone()),
            query: SalesQuery::new(inventory, store),
        }
    }
}

/// Pick the store and inventory client from configuration.
///
/// `DATABASE_URL` selects Postgres (schema bootstrapped on start); otherwise
/// sales live in memory for the lifetime of the process.
pub async fn build_services(config: &SalesConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn SaleStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresSaleStore::connect(url)
                .await
                .context("failed to connect to postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to bootstrap sales schema")?;
            tracing::info!("using postgres sale store");
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory sale store");
            Arc::new(InMemorySaleStore::new())
        }
    };

    let inventory: Option<Arc<dyn InventoryClient>> = match &config.inventory {
        Some(inventory) => {
            let client = HttpInventoryClient::new(inventory)
                .context("failed to build inventory client")?;
            tracing::info!(base_url = %inventory.base_url, "inventory client configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("INVENTORY_BASE_URL not set; inventory-backed endpoints will fail");
            None
        }
    };

    Ok(AppServices::new(inventory, store))
}
