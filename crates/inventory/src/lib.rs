//! Slotted container model (pure domain logic, no host runtime).
//!
//! A container holds at most `capacity` stacks; each stack is a quantity of
//! one item type in one cosmetic variant. Item type metadata is supplied by a
//! host-owned [`ItemCatalog`].

pub mod catalog;
pub mod container;
pub mod item;

pub use catalog::{InMemoryCatalog, ItemCatalog, MaterializationFailure};
pub use container::{Container, Position};
pub use item::{ItemType, Stack, StackKey, StackLimit};
