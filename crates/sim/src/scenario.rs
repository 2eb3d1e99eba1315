//! JSON scenario: one container, its catalog, and a consolidation request.

use serde::{Deserialize, Serialize};

use restack_consolidation::{ConsolidationConfig, ConsolidationResult, RecordingSink};
use restack_core::{ContainerId, DomainResult, ItemTypeId, Variant};
use restack_inventory::{Container, InMemoryCatalog, ItemType, Position, Stack};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<ConsolidationConfig>,
    pub capacity: usize,
    #[serde(default)]
    pub position: Position,
    pub target_stack_size: u64,
    pub item_types: Vec<ItemType>,
    pub stacks: Vec<ScenarioStack>,
    /// Item types whose overflow drop should fail.
    #[serde(default)]
    pub failing_drops: Vec<ItemTypeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStack {
    pub item_type: ItemTypeId,
    #[serde(default)]
    pub variant: Variant,
    pub quantity: u64,
}

impl Scenario {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn catalog(&self) -> InMemoryCatalog {
        self.item_types
            .iter()
            .cloned()
            .fold(InMemoryCatalog::new(), InMemoryCatalog::with_item_type)
    }

    pub fn container(&self) -> DomainResult<Container> {
        let mut container =
            Container::new(ContainerId::new(), self.capacity)?.with_position(self.position);
        for raw in &self.stacks {
            container.insert(Stack::new(raw.item_type, raw.variant, raw.quantity)?)?;
        }
        Ok(container)
    }

    pub fn sink(&self) -> RecordingSink {
        self.failing_drops
            .iter()
            .fold(RecordingSink::new(), |sink, item_type| {
                sink.fail_for(*item_type, "drop rejected by scenario")
            })
    }
}

/// What the simulator prints.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub result: &'a ConsolidationResult,
    pub layout: &'a [Option<Stack>],
    pub relocated_quantity: u64,
}
