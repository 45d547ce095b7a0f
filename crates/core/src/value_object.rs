//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a buyer CPF or a
/// price snapshot has no identity of its own. To "modify" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Cpf(String);
///
/// impl ValueObject for Cpf {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
