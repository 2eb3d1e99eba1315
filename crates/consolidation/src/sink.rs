//! Overflow sink contract.
//!
//! Quantity that cannot go back into the container is handed to the host,
//! typically to be dropped in the world next to the container. The engine
//! makes exactly one call per diverted stack and never retries.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use restack_core::{ContainerId, ItemTypeId};
use restack_inventory::{Position, StackKey};

/// The host could not relocate a diverted stack (e.g. no valid surface).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("overflow sink failed: {reason}")]
pub struct SinkFailure {
    pub reason: String,
}

impl SinkFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Where the host should put a diverted stack.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LocationHint {
    pub near_container: ContainerId,
    pub position: Position,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Relocation {
    pub key: StackKey,
    pub quantity: u64,
    pub hint: LocationHint,
}

pub trait OverflowSink {
    /// Relocate one diverted stack. Called once per stack; the call must have
    /// completed (successfully or not) when it returns.
    fn relocate(&mut self, relocation: &Relocation) -> Result<(), SinkFailure>;
}

/// Sink that keeps every relocation in memory.
///
/// Used by tests and by hosts that want to batch the actual world drops
/// after the operation. Individual item types can be set to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    relocated: Vec<Relocation>,
    failing: HashMap<ItemTypeId, String>,
    attempts: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every relocation of `item_type` fail with `reason`.
    pub fn fail_for(mut self, item_type: ItemTypeId, reason: impl Into<String>) -> Self {
        self.failing.insert(item_type, reason.into());
        self
    }

    /// Successfully relocated stacks, in call order.
    pub fn relocated(&self) -> &[Relocation] {
        &self.relocated
    }

    pub fn relocated_quantity(&self) -> u64 {
        self.relocated.iter().map(|r| r.quantity).sum()
    }

    /// Number of `relocate` calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl OverflowSink for RecordingSink {
    fn relocate(&mut self, relocation: &Relocation) -> Result<(), SinkFailure> {
        self.attempts += 1;
        if let Some(reason) = self.failing.get(&relocation.key.item_type) {
            return Err(SinkFailure::new(reason.clone()));
        }
        self.relocated.push(*relocation);
        Ok(())
    }
}
