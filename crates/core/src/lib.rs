//! `restack-core`: shared building blocks for the stack consolidation engine.
//!
//! This crate contains **pure domain** primitives (no IO, no host runtime).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ActorId, ContainerId, ItemTypeId, Variant};
pub use value_object::ValueObject;
pub use version::ExpectedVersion;
