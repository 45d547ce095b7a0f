use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::price::Price;

/// Inventory-side vehicle identifier (opaque to this service).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle status as reported by the inventory.
///
/// Only `AVAILABLE` makes a vehicle sellable. Statuses this service does not
/// know are kept verbatim so listings echo the upstream value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleStatus {
    Available,
    Sold,
    Other(String),
}

impl VehicleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::Sold => "SOLD",
            VehicleStatus::Other(s) => s,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, VehicleStatus::Available)
    }
}

impl From<String> for VehicleStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "AVAILABLE" => VehicleStatus::Available,
            "SOLD" => VehicleStatus::Sold,
            _ => VehicleStatus::Other(value),
        }
    }
}

impl From<VehicleStatus> for String {
    fn from(value: VehicleStatus) -> Self {
        match value {
            VehicleStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of an inventory vehicle.
///
/// Listings echo upstream vehicles, so decoding is lenient: the id is kept
/// in whatever JSON form the inventory uses, absent fields stay absent on
/// output, and any field not modelled here is carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// `None` when the inventory reported no status; such a vehicle is not sellable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Vehicle {
    pub fn is_available(&self) -> bool {
        self.status.as_ref().is_some_and(VehicleStatus::is_available)
    }

    /// Upstream status for messages and logs.
    pub fn status_label(&self) -> &str {
        self.status.as_ref().map_or("without status", VehicleStatus::as_str)
    }
}

/// Order vehicles by ascending price. Vehicles without a price sort first.
///
/// Relative order of equal prices is not part of the contract.
pub fn sort_by_price(vehicles: &mut [Vehicle]) {
    vehicles.sort_unstable_by(|a, b| a.price.cmp(&b.price));
}
