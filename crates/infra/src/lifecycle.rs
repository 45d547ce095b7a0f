//! Sale lifecycle engine.
//!
//! Coordinates the inventory client and the sale store for the two write
//! paths of the service:
//!
//! ```text
//! create_sale:       validate → inventory GET → Sale::open → store.create
//! payment webhook:   validate → store lookup → transition → store.update → inventory PATCH (PAID only)
//! ```
//!
//! No transaction spans the inventory read and the store write. Two
//! concurrent creations for the same vehicle may both succeed.
//!
//! Marking the vehicle as sold happens after the status change is committed.
//! It is a single attempt bounded by the client timeout, and a failure is
//! logged and swallowed: the webhook response reflects the stored sale.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use autosales_core::DomainError;
use autosales_sales::{CreateSale, PaymentNotification, Sale, ValidationErrors};

use crate::inventory::{InventoryClient, InventoryError};
use crate::store::{SaleStore, StoreError};

/// Failure kinds of the lifecycle and query services.
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("invalid payload: {0}")]
    InvalidPayload(ValidationErrors),

    /// The inventory base address is not configured.
    #[error("inventory configuration missing")]
    ConfigurationMissing,

    #[error("vehicle not found")]
    VehicleNotFound,

    #[error("vehicle is not available for sale")]
    VehicleUnavailable,

    #[error("inventory service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("sale not found")]
    SaleNotFound,

    /// The sale already reached a different terminal status.
    #[error("sale already finalized: {0}")]
    AlreadyFinalized(String),

    #[error("sale store failure: {0}")]
    Store(StoreError),
}

impl From<ValidationErrors> for SaleError {
    fn from(value: ValidationErrors) -> Self {
        SaleError::InvalidPayload(value)
    }
}

impl From<InventoryError> for SaleError {
    fn from(value: InventoryError) -> Self {
        if value.is_not_found() {
            SaleError::VehicleNotFound
        } else {
            SaleError::UpstreamUnavailable(value.to_string())
        }
    }
}

impl From<StoreError> for SaleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => SaleError::SaleNotFound,
            other => SaleError::Store(other),
        }
    }
}

/// Attempts at applying one notification when concurrent webhooks keep
/// moving the sale underneath. A sale changes status at most once, so the
/// second attempt always settles.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Creates sales and applies payment notifications.
#[derive(Clone)]
pub struct SaleLifecycle {
    inventory: Option<Arc<dyn InventoryClient>>,
    store: Arc<dyn SaleStore>,
}

impl SaleLifecycle {
    /// `inventory` is `None` when no inventory address is configured.
    pub fn new(inventory: Option<Arc<dyn InventoryClient>>, store: Arc<dyn SaleStore>) -> Self {
        Self { inventory, store }
    }

    fn inventory(&self) -> Result<&Arc<dyn InventoryClient>, SaleError> {
        self.inventory.as_ref().ok_or_else(|| {
            warn!("INVENTORY_BASE_URL is not configured");
            SaleError::ConfigurationMissing
        })
    }

    /// Open a sale for an available vehicle.
    ///
    /// Input is validated before the inventory configuration is checked, so a
    /// bad payload is reported as such even on a misconfigured instance.
    pub async fn create_sale(
        &self,
        vehicle_id: Option<String>,
        cpf_buyer: Option<String>,
    ) -> Result<Sale, SaleError> {
        let cmd = CreateSale::validate(vehicle_id, cpf_buyer)?;
        let inventory = self.inventory()?;

        let vehicle = inventory.get_vehicle(&cmd.vehicle_id).await?;
        if !vehicle.is_available() {
            info!(vehicle_id = %cmd.vehicle_id, status = vehicle.status_label(), "vehicle not available for sale");
            return Err(SaleError::VehicleUnavailable);
        }

        let sale = Sale::open(cmd, &vehicle, Utc::now()).map_err(|e| match e {
            DomainError::Conflict(_) => SaleError::VehicleUnavailable,
            other => SaleError::UpstreamUnavailable(other.to_string()),
        })?;

        let sale = self.store.create(sale).await?;
        info!(
            sale_id = %sale.id,
            payment_code = %sale.payment_code,
            vehicle_id = %sale.vehicle_id,
            "sale created"
        );
        Ok(sale)
    }

    /// Apply a payment outcome reported by the payment provider.
    ///
    /// Re-delivery of the outcome a sale already has is accepted without a
    /// write. A PAID re-delivery still attempts to mark the vehicle as sold,
    /// since that call may have failed the first time.
    pub async fn process_payment_webhook(
        &self,
        payment_code: Option<String>,
        status: Option<String>,
    ) -> Result<Sale, SaleError> {
        let notification = PaymentNotification::validate(payment_code, status)?;

        let sale = self.settle_outcome(&notification).await?;
        if sale.is_paid() {
            self.mark_vehicle_sold(&sale).await;
        }

        Ok(sale)
    }

    /// Read the sale, decide the transition and write it only if the status
    /// is still the one the decision was made on. A lost race re-reads and
    /// decides again, which ends as a redelivery or `AlreadyFinalized`.
    async fn settle_outcome(&self, notification: &PaymentNotification) -> Result<Sale, SaleError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut sale = self
                .store
                .find_by_payment_code(&notification.payment_code)
                .await?
                .ok_or(SaleError::SaleNotFound)?;

            let now = Utc::now();
            let change = sale
                .record_outcome(notification.outcome, now)
                .map_err(|e| SaleError::AlreadyFinalized(e.to_string()))?;

            if change.is_redelivery() {
                info!(payment_code = %sale.payment_code, status = %sale.status, "payment outcome redelivered");
                return Ok(sale);
            }

            match self
                .store
                .update_status(&sale.payment_code, change.from, change.to, now)
                .await
            {
                Ok(updated) => {
                    info!(
                        sale_id = %updated.id,
                        payment_code = %updated.payment_code,
                        from = %change.from,
                        to = %change.to,
                        "sale status updated"
                    );
                    return Ok(updated);
                }
                Err(StoreError::Stale(code)) if attempt < MAX_TRANSITION_ATTEMPTS => {
                    info!(payment_code = %code, "sale status changed concurrently; re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn mark_vehicle_sold(&self, sale: &Sale) {
        let Some(inventory) = self.inventory.as_ref() else {
            warn!(
                vehicle_id = %sale.vehicle_id,
                "INVENTORY_BASE_URL is not configured; vehicle not marked as sold"
            );
            return;
        };

        match inventory.mark_sold(&sale.vehicle_id).await {
            Ok(()) => info!(vehicle_id = %sale.vehicle_id, "vehicle marked as sold"),
            Err(e) => warn!(
                vehicle_id = %sale.vehicle_id,
                payment_code = %sale.payment_code,
                error = %e,
                "failed to mark vehicle as sold"
            ),
        }
    }
}
