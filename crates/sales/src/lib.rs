//! Sales domain module.
//!
//! Business rules for vehicle sales and their payment lifecycle, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod command;
pub mod sale;
pub mod status;
pub mod validation;

pub use command::{CreateSale, Cpf, PaymentNotification};
pub use sale::Sale;
pub use status::{PaymentOutcome, SaleStatus, StatusChange};
pub use validation::ValidationErrors;
