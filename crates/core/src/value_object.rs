//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; two instances
/// with the same attribute values are the same thing. The inventory key
/// (product, size, color) is the canonical example in this codebase: there is
/// no "identity" beyond the triple itself, which is what makes it usable as a
/// map key during aggregation.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
