//! Item catalog collaborator.
//!
//! The host owns item metadata and is the only party that can create item
//! instances. The engine asks it for stack limits and to materialize stacks.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use restack_core::{DomainError, ItemTypeId};

use crate::item::{ItemType, Stack, StackKey, StackLimit};

/// The catalog could not produce an instance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterializationFailure {
    #[error("unknown item type {0}")]
    UnknownItemType(ItemTypeId),

    #[error("catalog refused to create {item_type}: {reason}")]
    Refused { item_type: ItemTypeId, reason: String },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

pub trait ItemCatalog {
    fn item_type(&self, id: ItemTypeId) -> Option<ItemType>;

    /// Stack limit for an item type. Unknown types have no finite maximum.
    fn max_stack(&self, id: ItemTypeId) -> StackLimit {
        self.item_type(id)
            .map_or(StackLimit::Unbounded, |item_type| item_type.max_stack)
    }

    /// Create a fresh stack of `quantity` units.
    fn materialize(&self, key: StackKey, quantity: u64) -> Result<Stack, MaterializationFailure> {
        if self.item_type(key.item_type).is_none() {
            return Err(MaterializationFailure::UnknownItemType(key.item_type));
        }
        Ok(Stack::with_key(key, quantity)?)
    }
}

impl<C: ItemCatalog + ?Sized> ItemCatalog for &C {
    fn item_type(&self, id: ItemTypeId) -> Option<ItemType> {
        (**self).item_type(id)
    }

    fn max_stack(&self, id: ItemTypeId) -> StackLimit {
        (**self).max_stack(id)
    }

    fn materialize(&self, key: StackKey, quantity: u64) -> Result<Stack, MaterializationFailure> {
        (**self).materialize(key, quantity)
    }
}

/// `HashMap`-backed catalog for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    types: HashMap<ItemTypeId, ItemType>,
    refused: HashSet<ItemTypeId>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_type(mut self, item_type: ItemType) -> Self {
        self.register(item_type);
        self
    }

    pub fn register(&mut self, item_type: ItemType) {
        self.types.insert(item_type.id, item_type);
    }

    /// Make every later materialization of `id` fail.
    pub fn refuse(&mut self, id: ItemTypeId) {
        self.refused.insert(id);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ItemCatalog for InMemoryCatalog {
    fn item_type(&self, id: ItemTypeId) -> Option<ItemType> {
        self.types.get(&id).cloned()
    }

    fn materialize(&self, key: StackKey, quantity: u64) -> Result<Stack, MaterializationFailure> {
        if self.refused.contains(&key.item_type) {
            return Err(MaterializationFailure::Refused {
                item_type: key.item_type,
                reason: "creation disabled".to_string(),
            });
        }
        if !self.types.contains_key(&key.item_type) {
            return Err(MaterializationFailure::UnknownItemType(key.item_type));
        }
        Ok(Stack::with_key(key, quantity)?)
    }
}
