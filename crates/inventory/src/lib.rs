//! Inventory projection (read-only).
//!
//! Vehicles are owned by the external inventory service. This crate only
//! describes the shape this service reads back from it (no IO, no HTTP).

pub mod price;
pub mod vehicle;

pub use price::Price;
pub use vehicle::{Vehicle, VehicleId, VehicleStatus, sort_by_price};
