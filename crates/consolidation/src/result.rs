use serde::Serialize;

use restack_core::{ContainerId, ValueObject};
use restack_inventory::{Stack, StackKey};

use crate::events::{ContainerConsolidated, ConsolidationEvent, QuantityDiverted};
use crate::policy::TargetStackSize;
use crate::request::ConsolidationRequest;
use crate::sink::SinkFailure;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Everything went back into the container.
    Success,
    /// Some quantity was diverted to the overflow sink.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenStack {
    pub slot: usize,
    pub stack: Stack,
}

/// Why a planned stack did not go back into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiversionReason {
    /// No free slot was left.
    CapacityExhausted,
    /// The item catalog could not create the stack.
    MaterializationFailed { detail: String },
    /// The container refused a freshly created stack.
    InsertRejected { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkOutcome {
    Relocated,
    /// The sink call failed; the quantity needs manual handling.
    Failed(SinkFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diversion {
    pub key: StackKey,
    pub quantity: u64,
    pub reason: DiversionReason,
    pub sink: SinkOutcome,
}

impl Diversion {
    pub fn relocated(&self) -> bool {
        matches!(self.sink, SinkOutcome::Relocated)
    }
}

/// Everything a caller needs to report on one consolidation.
///
/// Each written or diverted entry is one planned stack, and a plan's total is
/// checked against `u64::MAX` when it is built, so the quantity sums below
/// cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidationResult {
    container: ContainerId,
    target: TargetStackSize,
    written: Vec<WrittenStack>,
    diverted: Vec<Diversion>,
}

impl ConsolidationResult {
    pub(crate) fn new(
        container: ContainerId,
        target: TargetStackSize,
        written: Vec<WrittenStack>,
        diverted: Vec<Diversion>,
    ) -> Self {
        Self {
            container,
            target,
            written,
            diverted,
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn target(&self) -> TargetStackSize {
        self.target
    }

    pub fn outcome(&self) -> Outcome {
        if self.diverted.is_empty() {
            Outcome::Success
        } else {
            Outcome::Partial
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }

    /// Stacks written back, in write order.
    pub fn written(&self) -> &[WrittenStack] {
        &self.written
    }

    pub fn diverted(&self) -> &[Diversion] {
        &self.diverted
    }

    pub fn slots_used(&self) -> usize {
        self.written.len()
    }

    pub fn written_quantity(&self) -> u64 {
        self.written.iter().map(|w| w.stack.quantity()).sum()
    }

    pub fn diverted_quantity(&self) -> u64 {
        self.diverted.iter().map(|d| d.quantity).sum()
    }

    /// Diverted quantity whose sink call failed.
    pub fn lost_quantity(&self) -> u64 {
        self.diverted
            .iter()
            .filter(|d| !d.relocated())
            .map(|d| d.quantity)
            .sum()
    }

    pub fn sink_failures(&self) -> impl Iterator<Item = (&Diversion, &SinkFailure)> {
        self.diverted.iter().filter_map(|d| match &d.sink {
            SinkOutcome::Failed(failure) => Some((d, failure)),
            SinkOutcome::Relocated => None,
        })
    }

    /// Events describing this result: one per diversion, then a summary.
    pub fn events(&self, request: &ConsolidationRequest) -> Vec<ConsolidationEvent> {
        let mut events: Vec<ConsolidationEvent> = self
            .diverted
            .iter()
            .map(|d| {
                ConsolidationEvent::QuantityDiverted(QuantityDiverted {
                    container_id: self.container,
                    actor: request.actor,
                    key: d.key,
                    quantity: d.quantity,
                    reason: d.reason.clone(),
                    relocated: d.relocated(),
                    occurred_at: request.occurred_at,
                })
            })
            .collect();

        events.push(ConsolidationEvent::ContainerConsolidated(ContainerConsolidated {
            container_id: self.container,
            actor: request.actor,
            target_stack_size: self.target.get(),
            outcome: self.outcome(),
            stacks_written: self.slots_used(),
            quantity_written: self.written_quantity(),
            quantity_diverted: self.diverted_quantity(),
            quantity_lost: self.lost_quantity(),
            occurred_at: request.occurred_at,
        }));

        events
    }
}

impl ValueObject for ConsolidationResult {}
