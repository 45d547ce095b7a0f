//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A sale keeps its identity while its payment status moves; two records with
/// the same id are the same sale regardless of their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
