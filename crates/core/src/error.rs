//! Domain error model.

use thiserror::Error;

/// Failure raised by the pure domain types.
///
/// Only rule violations live here: malformed values, impossible states,
/// status changes that contradict the current state. HTTP and storage failures
/// are modelled by the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value is malformed (negative price, wrong CPF length, unknown status).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Data needed to uphold a rule is missing or inconsistent.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The change contradicts the current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
