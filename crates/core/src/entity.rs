//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Containers are entities: two containers holding the same stacks are still
/// different containers.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing revision of the entity's state.
    ///
    /// Incremented once per successful mutation; used for optimistic
    /// concurrency checks between a snapshot and a later write.
    fn version(&self) -> u64;
}
