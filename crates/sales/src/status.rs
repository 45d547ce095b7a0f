use serde::{Deserialize, Serialize};

use autosales_core::DomainError;

/// Sale payment lifecycle.
///
/// `PendingPayment` is the only initial state; `Paid` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    PendingPayment,
    Paid,
    Canceled,
}

/// Outcome reported by the payment provider's webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Paid,
    Canceled,
}

/// Result of applying a payment outcome to a sale status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: SaleStatus,
    pub to: SaleStatus,
}

impl StatusChange {
    /// The outcome was already recorded (webhook redelivery).
    pub fn is_redelivery(&self) -> bool {
        self.from == self.to
    }
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::PendingPayment => "PENDING_PAYMENT",
            SaleStatus::Paid => "PAID",
            SaleStatus::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SaleStatus::PendingPayment)
    }

    /// Decide the next status for a reported payment outcome.
    ///
    /// - `PendingPayment` moves to the outcome's status.
    /// - A terminal status receiving the same outcome again is a no-op change.
    /// - A terminal status receiving the opposite outcome is a conflict.
    pub fn apply_outcome(self, outcome: PaymentOutcome) -> Result<StatusChange, DomainError> {
        let target = outcome.target_status();
        if !self.is_terminal() || self == target {
            return Ok(StatusChange { from: self, to: target });
        }
        Err(DomainError::conflict(format!(
            "sale is already {} and cannot become {}",
            self.as_str(),
            target.as_str()
        )))
    }
}

impl core::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for SaleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(SaleStatus::PendingPayment),
            "PAID" => Ok(SaleStatus::Paid),
            "CANCELED" => Ok(SaleStatus::Canceled),
            other => Err(DomainError::validation(format!("unknown sale status: {other}"))),
        }
    }
}

impl PaymentOutcome {
    pub const ACCEPTED: &'static str = "PAID, CANCELED";

    pub fn target_status(&self) -> SaleStatus {
        match self {
            PaymentOutcome::Paid => SaleStatus::Paid,
            PaymentOutcome::Canceled => SaleStatus::Canceled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.target_status().as_str()
    }
}

impl core::str::FromStr for PaymentOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(PaymentOutcome::Paid),
            "CANCELED" => Ok(PaymentOutcome::Canceled),
            other => Err(DomainError::validation(format!(
                "unknown payment status: {other} (expected one of: {})",
                PaymentOutcome::ACCEPTED
            ))),
        }
    }
}
