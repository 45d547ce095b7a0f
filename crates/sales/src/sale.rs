use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autosales_core::{DomainError, Entity, PaymentCode, SaleId};
use autosales_inventory::{Price, Vehicle, VehicleId};

use crate::command::{CreateSale, Cpf};
use crate::status::{PaymentOutcome, SaleStatus, StatusChange};

/// A vehicle purchase attempt, keyed by its payment code.
///
/// Price, brand, model and color are a snapshot of the vehicle taken when the
/// sale was opened; later inventory changes never flow back into the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub vehicle_id: VehicleId,
    pub cpf_buyer: Cpf,
    pub price: Price,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub payment_code: PaymentCode,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Open a new sale awaiting payment.
    ///
    /// The vehicle must be `AVAILABLE` and carry a price. A fresh payment code
    /// is issued for every sale.
    pub fn open(cmd: CreateSale, vehicle: &Vehicle, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if !vehicle.is_available() {
            return Err(DomainError::conflict(format!(
                "vehicle {} is {}",
                cmd.vehicle_id,
                vehicle.status_label()
            )));
        }

        let price = vehicle
            .price
            .ok_or_else(|| DomainError::invariant("inventory vehicle has no price"))?;

        Ok(Self {
            id: SaleId::new(),
            vehicle_id: cmd.vehicle_id,
            cpf_buyer: cmd.cpf_buyer,
            price,
            brand: vehicle.brand.clone().unwrap_or_default(),
            model: vehicle.model.clone().unwrap_or_default(),
            color: vehicle.color.clone().unwrap_or_default(),
            payment_code: PaymentCode::generate(),
            status: SaleStatus::PendingPayment,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a reported payment outcome to this sale.
    ///
    /// Redelivery of an already recorded outcome leaves the record untouched.
    pub fn record_outcome(
        &mut self,
        outcome: PaymentOutcome,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, DomainError> {
        let change = self.status.apply_outcome(outcome)?;
        if !change.is_redelivery() {
            self.status = change.to;
            self.updated_at = now;
        }
        Ok(change)
    }

    pub fn is_paid(&self) -> bool {
        self.status == SaleStatus::Paid
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
