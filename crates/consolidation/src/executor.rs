//! Allocation executor: writes a plan back into the container.

use tracing::{debug, error, info, warn};

use restack_core::Entity;
use restack_inventory::{Container, ItemCatalog, Stack};

use crate::config::DEFAULT_DROP_HEIGHT;
use crate::error::ConsolidationError;
use crate::planner::{Plan, PlannedStack, group_totals};
use crate::result::{ConsolidationResult, Diversion, DiversionReason, SinkOutcome, WrittenStack};
use crate::sink::{LocationHint, OverflowSink, Relocation};

#[derive(Debug, Clone)]
pub struct Executor {
    drop_height: f32,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_DROP_HEIGHT)
    }
}

impl Executor {
    pub fn new(drop_height: f32) -> Self {
        Self { drop_height }
    }

    /// Apply `plan` to `container`.
    ///
    /// Fails without touching the container if it no longer matches the
    /// snapshot the plan was computed from. Once stacks have been drained the
    /// operation always runs to completion: every planned stack is either
    /// written back or handed to `sink` exactly once.
    pub fn apply(
        &self,
        container: &mut Container,
        plan: &Plan,
        catalog: &dyn ItemCatalog,
        sink: &mut dyn OverflowSink,
    ) -> Result<ConsolidationResult, ConsolidationError> {
        verify_unchanged(container, plan)?;

        let container_id = *container.id();
        let hint = LocationHint {
            near_container: container_id,
            position: container.position().raised(self.drop_height),
        };

        let drained = container.drain();
        debug!(stacks = drained.len(), "drained container");

        let mut written = Vec::with_capacity(plan.stacks().len().min(container.capacity()));
        let mut diverted = Vec::new();

        for planned in plan.stacks() {
            let reason = if container.is_full() {
                DiversionReason::CapacityExhausted
            } else {
                match materialize(catalog, planned) {
                    Ok(stack) => match container.insert(stack.clone()) {
                        Ok(slot) => {
                            written.push(WrittenStack { slot, stack });
                            continue;
                        }
                        Err(e) => DiversionReason::InsertRejected {
                            detail: e.to_string(),
                        },
                    },
                    Err(reason) => reason,
                }
            };
            diverted.push(divert(planned, reason, hint, sink));
        }

        let result = ConsolidationResult::new(container_id, plan.target(), written, diverted);
        info!(
            container = %container_id,
            outcome = ?result.outcome(),
            slots_used = result.slots_used(),
            diverted = result.diverted_quantity(),
            lost = result.lost_quantity(),
            "consolidation applied"
        );
        Ok(result)
    }
}

fn verify_unchanged(container: &Container, plan: &Plan) -> Result<(), ConsolidationError> {
    let container_id = *container.id();
    plan.source_version()
        .check(container.version())
        .map_err(|e| ConsolidationError::concurrent_modification(container_id, e.to_string()))?;

    if group_totals(container.stacks())? != plan.totals() {
        return Err(ConsolidationError::concurrent_modification(
            container_id,
            "container contents no longer match the planned totals",
        ));
    }
    Ok(())
}

/// Ask the catalog for a stack and make sure it is the one that was asked for.
fn materialize(catalog: &dyn ItemCatalog, planned: &PlannedStack) -> Result<Stack, DiversionReason> {
    let stack = catalog
        .materialize(planned.key, planned.quantity)
        .map_err(|e| DiversionReason::MaterializationFailed {
            detail: e.to_string(),
        })?;

    if stack.key() != planned.key || stack.quantity() != planned.quantity {
        return Err(DiversionReason::MaterializationFailed {
            detail: format!(
                "catalog returned {} x{} for {} x{}",
                stack.key(),
                stack.quantity(),
                planned.key,
                planned.quantity
            ),
        });
    }
    Ok(stack)
}

fn divert(
    planned: &PlannedStack,
    reason: DiversionReason,
    hint: LocationHint,
    sink: &mut dyn OverflowSink,
) -> Diversion {
    warn!(key = %planned.key, quantity = planned.quantity, ?reason, "diverting to overflow");

    let relocation = Relocation {
        key: planned.key,
        quantity: planned.quantity,
        hint,
    };
    let sink_outcome = match sink.relocate(&relocation) {
        Ok(()) => SinkOutcome::Relocated,
        Err(failure) => {
            error!(
                key = %planned.key,
                quantity = planned.quantity,
                error = %failure,
                "overflow sink failed; quantity needs manual handling"
            );
            SinkOutcome::Failed(failure)
        }
    };

    Diversion {
        key: planned.key,
        quantity: planned.quantity,
        reason,
        sink: sink_outcome,
    }
}
