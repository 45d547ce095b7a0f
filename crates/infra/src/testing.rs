//! Shared fixtures for the infra unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, json};

use autosales_core::{PaymentCode, SaleId};
use autosales_inventory::{Price, Vehicle, VehicleId, VehicleStatus};
use autosales_sales::{Cpf, Sale, SaleStatus};

use crate::inventory::{InventoryClient, InventoryError};
use crate::store::{InMemorySaleStore, SaleStore, StoreError};

pub fn sale_with(code: &str, price: u32, status: SaleStatus) -> Sale {
    let now = Utc::now();
    Sale {
        id: SaleId::new(),
        vehicle_id: VehicleId::new("v1"),
        cpf_buyer: Cpf::parse("12345678901").unwrap(),
        price: Price::from(price),
        brand: "Ford".to_string(),
        model: "Fiesta".to_string(),
        color: "Preto".to_string(),
        payment_code: PaymentCode::parse(code).unwrap(),
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn vehicle(id: &str, price: u32, status: VehicleStatus) -> Vehicle {
    Vehicle {
        id: Some(json!(id)),
        brand: Some("Ford".to_string()),
        model: Some("Fiesta".to_string()),
        color: Some("Preto".to_string()),
        price: Some(Price::from(price)),
        status: Some(status),
        extra: Map::new(),
    }
}

#[derive(Default)]
struct FakeState {
    vehicles: HashMap<String, Vehicle>,
    failure: Option<InventoryError>,
    mark_sold_failure: Option<InventoryError>,
    get_calls: usize,
    list_calls: usize,
    sold: Vec<VehicleId>,
}

/// Scriptable inventory double that records every call.
#[derive(Default)]
pub struct FakeInventory {
    state: Mutex<FakeState>,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicle(self, vehicle: Vehicle) -> Self {
        let key = vehicle
            .id
            .as_ref()
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();
        self.state.lock().unwrap().vehicles.insert(key, vehicle);
        self
    }

    /// Make every read call fail with `err`.
    pub fn failing(self, err: InventoryError) -> Self {
        self.state.lock().unwrap().failure = Some(err);
        self
    }

    pub fn failing_mark_sold(self, err: InventoryError) -> Self {
        self.state.lock().unwrap().mark_sold_failure = Some(err);
        self
    }

    pub fn sold(&self) -> Vec<VehicleId> {
        self.state.lock().unwrap().sold.clone()
    }

    /// Total number of calls of any kind.
    pub fn calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.get_calls + state.list_calls + state.sold.len()
    }
}

#[async_trait::async_trait]
impl InventoryClient for FakeInventory {
    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, InventoryError> {
        let mut state = self.state.lock().unwrap();
        state.get_calls += 1;
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        state
            .vehicles
            .get(id.as_str())
            .cloned()
            .ok_or(InventoryError::NotFound)
    }

    async fn list_available_vehicles(&self) -> Result<Vec<Vehicle>, InventoryError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        Ok(state
            .vehicles
            .values()
            .filter(|v| v.is_available())
            .cloned()
            .collect())
    }

    async fn mark_sold(&self, id: &VehicleId) -> Result<(), InventoryError> {
        let mut state = self.state.lock().unwrap();
        state.sold.push(id.clone());
        match state.mark_sold_failure.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// In-memory store whose reads return only after `delay`, widening the
/// window between a read and the write that follows it.
pub struct SlowReadStore {
    inner: InMemorySaleStore,
    delay: Duration,
}

impl SlowReadStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemorySaleStore::new(),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl SaleStore for SlowReadStore {
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError> {
        self.inner.create(sale).await
    }

    async fn find_by_payment_code(&self, code: &PaymentCode) -> Result<Option<Sale>, StoreError> {
        let found = self.inner.find_by_payment_code(code).await;
        tokio::time::sleep(self.delay).await;
        found
    }

    async fn update_status(
        &self,
        code: &PaymentCode,
        from: SaleStatus,
        to: SaleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Sale, StoreError> {
        self.inner.update_status(code, from, to, updated_at).await
    }

    async fn list_by_status(&self, status: SaleStatus) -> Result<Vec<Sale>, StoreError> {
        self.inner.list_by_status(status).await
    }
}
