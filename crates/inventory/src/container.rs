use serde::{Deserialize, Serialize};

use restack_core::{ContainerId, DomainError, DomainResult, Entity};

use crate::item::{Stack, StackKey};

/// World position of a container, used to place overflow near it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The same position raised by `height` on the vertical axis.
    pub fn raised(self, height: f32) -> Self {
        Self {
            y: self.y + height,
            ..self
        }
    }
}

/// Fixed-capacity slotted storage.
///
/// Invariants:
/// - `slots.len() == capacity`, capacity is at least one
/// - `version` increases by exactly one per successful mutation
/// - the quantity across all slots fits in a `u64`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    id: ContainerId,
    capacity: usize,
    slots: Vec<Option<Stack>>,
    position: Position,
    version: u64,
}

impl Container {
    pub fn new(id: ContainerId, capacity: usize) -> DomainResult<Self> {
        if capacity == 0 {
            return Err(DomainError::validation("container capacity must be positive"));
        }
        Ok(Self {
            id,
            capacity,
            slots: vec![None; capacity],
            position: Position::default(),
            version: 0,
        })
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn slots(&self) -> &[Option<Stack>] {
        &self.slots
    }

    /// Occupied slots in slot order.
    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.slots.iter().flatten()
    }

    pub fn slots_used(&self) -> usize {
        self.stacks().count()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity - self.slots_used()
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    /// Cannot overflow: `insert` and `put` refuse stacks that would push the
    /// container total past `u64::MAX`.
    pub fn total_quantity(&self) -> u64 {
        self.stacks().map(Stack::quantity).sum()
    }

    pub fn quantity_of(&self, key: StackKey) -> u64 {
        self.stacks()
            .filter(|s| s.key() == key)
            .map(Stack::quantity)
            .sum()
    }

    /// Place a stack in the first free slot and return that slot's index.
    pub fn insert(&mut self, stack: Stack) -> DomainResult<usize> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| DomainError::capacity_exceeded(self.capacity))?;
        self.ensure_room_for(&stack, 0)?;
        self.slots[slot] = Some(stack);
        self.version += 1;
        Ok(slot)
    }

    /// Place a stack in a specific slot, returning whatever occupied it.
    pub fn put(&mut self, slot: usize, stack: Stack) -> DomainResult<Option<Stack>> {
        let replaced = match self.slots.get(slot) {
            Some(cell) => cell.as_ref().map_or(0, Stack::quantity),
            None => {
                return Err(DomainError::validation(format!(
                    "slot {slot} out of range (capacity {})",
                    self.capacity
                )));
            }
        };
        self.ensure_room_for(&stack, replaced)?;
        let previous = self.slots[slot].replace(stack);
        self.version += 1;
        Ok(previous)
    }

    fn ensure_room_for(&self, stack: &Stack, replaced: u64) -> DomainResult<()> {
        (self.total_quantity() - replaced)
            .checked_add(stack.quantity())
            .map(|_| ())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "adding {} x{} would overflow the container's total quantity",
                    stack.key(),
                    stack.quantity()
                ))
            })
    }

    pub fn take(&mut self, slot: usize) -> Option<Stack> {
        let taken = self.slots.get_mut(slot)?.take();
        if taken.is_some() {
            self.version += 1;
        }
        taken
    }

    /// Remove every stack, leaving all slots empty.
    pub fn drain(&mut self) -> Vec<Stack> {
        let drained: Vec<Stack> = self.slots.iter_mut().filter_map(Option::take).collect();
        if !drained.is_empty() {
            self.version += 1;
        }
        drained
    }
}

impl Entity for Container {
    type Id = ContainerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
