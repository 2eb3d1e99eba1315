//! Events a host can subscribe to for chat replies, UI refresh or audit logs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use restack_core::{ActorId, ContainerId};
use restack_events::Event;
use restack_inventory::StackKey;

use crate::result::{DiversionReason, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerConsolidated {
    pub container_id: ContainerId,
    pub actor: ActorId,
    pub target_stack_size: u64,
    pub outcome: Outcome,
    pub stacks_written: usize,
    pub quantity_written: u64,
    pub quantity_diverted: u64,
    pub quantity_lost: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityDiverted {
    pub container_id: ContainerId,
    pub actor: ActorId,
    pub key: StackKey,
    pub quantity: u64,
    pub reason: DiversionReason,
    pub relocated: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConsolidationEvent {
    ContainerConsolidated(ContainerConsolidated),
    QuantityDiverted(QuantityDiverted),
}

impl Event for ConsolidationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ConsolidationEvent::ContainerConsolidated(_) => "consolidation.container.consolidated",
            ConsolidationEvent::QuantityDiverted(_) => "consolidation.quantity.diverted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ConsolidationEvent::ContainerConsolidated(e) => e.occurred_at,
            ConsolidationEvent::QuantityDiverted(e) => e.occurred_at,
        }
    }
}
