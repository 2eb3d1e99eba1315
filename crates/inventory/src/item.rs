use core::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use restack_core::{DomainError, DomainResult, ItemTypeId, ValueObject, Variant};

/// Per-item-type ceiling on how many units fit in one slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackLimit {
    Bounded(NonZeroU64),
    Unbounded,
}

impl StackLimit {
    /// Interpret a catalog's declared stack size.
    ///
    /// Catalogs declare "no finite maximum" with a non-positive number.
    pub fn from_declared(declared: i64) -> Self {
        u64::try_from(declared)
            .ok()
            .and_then(NonZeroU64::new)
            .map_or(StackLimit::Unbounded, StackLimit::Bounded)
    }

    /// A finite limit; zero is treated like a non-positive declaration.
    pub fn bounded(max: u64) -> Self {
        NonZeroU64::new(max).map_or(StackLimit::Unbounded, StackLimit::Bounded)
    }

    /// The stack size actually used for a requested target: the smaller of the
    /// two, and never below one unit.
    pub fn effective(self, target: u64) -> u64 {
        let limit = match self {
            StackLimit::Bounded(max) => target.min(max.get()),
            StackLimit::Unbounded => target,
        };
        limit.max(1)
    }
}

/// Immutable item type descriptor owned by the host's item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: ItemTypeId,
    pub name: String,
    pub max_stack: StackLimit,
}

impl ItemType {
    pub fn new(id: ItemTypeId, name: impl Into<String>, max_stack: StackLimit) -> Self {
        Self {
            id,
            name: name.into(),
            max_stack,
        }
    }
}

/// Grouping key: quantities merge only when both item type and variant match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackKey {
    pub item_type: ItemTypeId,
    pub variant: Variant,
}

impl StackKey {
    pub fn new(item_type: ItemTypeId, variant: Variant) -> Self {
        Self { item_type, variant }
    }
}

impl core::fmt::Display for StackKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.item_type, self.variant)
    }
}

impl ValueObject for StackKey {}

/// A single slot's contents. Quantity is always at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Stack {
    key: StackKey,
    quantity: u64,
}

impl Stack {
    pub fn new(item_type: ItemTypeId, variant: Variant, quantity: u64) -> DomainResult<Self> {
        Self::with_key(StackKey::new(item_type, variant), quantity)
    }

    pub fn with_key(key: StackKey, quantity: u64) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "stack of {key} must hold at least one unit"
            )));
        }
        Ok(Self { key, quantity })
    }

    pub fn key(&self) -> StackKey {
        self.key
    }

    pub fn item_type(&self) -> ItemTypeId {
        self.key.item_type
    }

    pub fn variant(&self) -> Variant {
        self.key.variant
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }
}

impl ValueObject for Stack {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn non_positive_declared_sizes_are_unbounded() {
        assert_eq!(StackLimit::from_declared(0), StackLimit::Unbounded);
        assert_eq!(StackLimit::from_declared(-1), StackLimit::Unbounded);
        assert_eq!(StackLimit::from_declared(1000), StackLimit::bounded(1000));
    }

    #[test]
    fn effective_max_is_smaller_of_target_and_limit() {
        assert_eq!(StackLimit::bounded(10_000).effective(5000), 5000);
        assert_eq!(StackLimit::bounded(1000).effective(2000), 1000);
        assert_eq!(StackLimit::Unbounded.effective(3000), 3000);
    }

    #[test]
    fn zero_quantity_stack_is_rejected() {
        let err = Stack::new(ItemTypeId(1), Variant::DEFAULT, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn stack_limit_serializes_as_tagged_enum() {
        let json = serde_json::to_string(&StackLimit::bounded(100)).unwrap();
        assert_eq!(json, r#"{"bounded":100}"#);
        let unbounded: StackLimit = serde_json::from_str(r#""unbounded""#).unwrap();
        assert_eq!(unbounded, StackLimit::Unbounded);
    }

    proptest! {
        #[test]
        fn effective_max_never_exceeds_either_bound(max in 1u64..100_000, target in 1u64..100_000) {
            let effective = StackLimit::bounded(max).effective(target);
            prop_assert!(effective >= 1);
            prop_assert!(effective <= max);
            prop_assert!(effective <= target);
        }
    }
}
