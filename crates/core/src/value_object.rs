//! Value object trait: equality by value, not identity.
//!
//! Stacks, plans and results are value objects: two stacks of 500 units of the
//! same item type and variant are interchangeable.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Quantity(u64);
///
/// impl ValueObject for Quantity {}
///
/// assert_eq!(Quantity(5), Quantity(5));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
