use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use autosales_core::PaymentCode;
use autosales_sales::{Sale, SaleStatus};

use super::{SaleStore, StoreError};

/// In-memory sale store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySaleStore {
    inner: RwLock<HashMap<PaymentCode, Sale>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sales.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("sale store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl SaleStore for InMemorySaleStore {
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&sale.payment_code) {
            return Err(StoreError::Duplicate(sale.payment_code));
        }
        map.insert(sale.payment_code.clone(), sale.clone());
        Ok(sale)
    }

    async fn find_by_payment_code(&self, code: &PaymentCode) -> Result<Option<Sale>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(code).cloned())
    }

    async fn update_status(
        &self,
        code: &PaymentCode,
        from: SaleStatus,
        to: SaleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Sale, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let sale = map
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;
        if sale.status != from {
            return Err(StoreError::Stale(code.clone()));
        }
        sale.status = to;
        sale.updated_at = updated_at;
        Ok(sale.clone())
    }

    async fn list_by_status(&self, status: SaleStatus) -> Result<Vec<Sale>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut sales: Vec<Sale> = map.values().filter(|s| s.status == status).cloned().collect();
        sales.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(sales)
    }
}
