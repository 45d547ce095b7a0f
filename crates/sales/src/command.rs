use serde::{Deserialize, Serialize};

use autosales_core::{DomainError, PaymentCode, ValueObject};
use autosales_inventory::VehicleId;

use crate::status::PaymentOutcome;
use crate::validation::ValidationErrors;

/// Buyer's CPF (Brazilian taxpayer id). Exactly 11 characters; not checksummed.
///
/// Length is counted in UTF-16 code units (JavaScript string length), so a
/// character outside the BMP counts twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    pub const LEN: usize = 11;

    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.encode_utf16().count() != Self::LEN {
            return Err(DomainError::validation(format!(
                "must be exactly {} characters",
                Self::LEN
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Cpf {}

impl TryFrom<String> for Cpf {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cpf> for String {
    fn from(value: Cpf) -> Self {
        value.0
    }
}

/// Command: open a sale for an inventory vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSale {
    pub vehicle_id: VehicleId,
    pub cpf_buyer: Cpf,
}

impl CreateSale {
    /// Validate the raw payload fields (as received over the wire).
    pub fn validate(
        vehicle_id: Option<String>,
        cpf_buyer: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let vehicle_id = match vehicle_id {
            Some(id) if !id.is_empty() => Some(VehicleId::new(id)),
            Some(_) => {
                errors.add("vehicleId", "must not be empty");
                None
            }
            None => {
                errors.add("vehicleId", "required");
                None
            }
        };

        let cpf_buyer = match cpf_buyer {
            Some(raw) => match Cpf::parse(raw) {
                Ok(cpf) => Some(cpf),
                Err(_) => {
                    errors.add(
                        "cpfBuyer",
                        format!("must be exactly {} characters", Cpf::LEN),
                    );
                    None
                }
            },
            None => {
                errors.add("cpfBuyer", "required");
                None
            }
        };

        match (vehicle_id, cpf_buyer) {
            (Some(vehicle_id), Some(cpf_buyer)) if errors.is_empty() => Ok(Self {
                vehicle_id,
                cpf_buyer,
            }),
            _ => Err(errors),
        }
    }
}

/// Command: record a payment outcome reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    pub payment_code: PaymentCode,
    pub outcome: PaymentOutcome,
}

impl PaymentNotification {
    pub fn validate(
        payment_code: Option<String>,
        status: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let payment_code = match payment_code.map(PaymentCode::parse) {
            Some(Ok(code)) => Some(code),
            Some(Err(_)) => {
                errors.add("paymentCode", "must not be empty");
                None
            }
            None => {
                errors.add("paymentCode", "required");
                None
            }
        };

        let outcome = match status.as_deref().map(str::parse::<PaymentOutcome>) {
            Some(Ok(outcome)) => Some(outcome),
            Some(Err(_)) => {
                errors.add(
                    "status",
                    format!("must be one of: {}", PaymentOutcome::ACCEPTED),
                );
                None
            }
            None => {
                errors.add("status", "required");
                None
            }
        };

        match (payment_code, outcome) {
            (Some(payment_code), Some(outcome)) => Ok(Self {
                payment_code,
                outcome,
            }),
            _ => Err(errors),
        }
    }
}
