//! Entry point used by host command handlers.

use tracing::{error, instrument};

use restack_core::Entity;
use restack_events::EventBus;
use restack_inventory::{Container, ItemCatalog};

use crate::config::ConsolidationConfig;
use crate::error::ConsolidationError;
use crate::events::ConsolidationEvent;
use crate::executor::Executor;
use crate::planner::{Plan, Planner};
use crate::policy::StackSizePolicy;
use crate::request::ConsolidationRequest;
use crate::result::ConsolidationResult;
use crate::sink::OverflowSink;

/// Validates requests, plans and applies them.
///
/// Holds no per-container state: one service can serve any number of
/// containers, from any number of threads. Exclusive access to a container
/// for the whole snapshot/plan/apply sequence comes from the `&mut Container`
/// borrow in [`ConsolidationService::consolidate`].
#[derive(Debug, Clone)]
pub struct ConsolidationService {
    config: ConsolidationConfig,
    planner: Planner,
    executor: Executor,
}

impl Default for ConsolidationService {
    fn default() -> Self {
        Self::new(ConsolidationConfig::default())
    }
}

impl ConsolidationService {
    pub fn new(config: ConsolidationConfig) -> Self {
        Self {
            planner: Planner::new(config.policy()),
            executor: Executor::new(config.overflow_drop_height),
            config,
        }
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    pub fn policy(&self) -> &StackSizePolicy {
        self.planner.policy()
    }

    /// Compute the layout a request would produce, without touching the container.
    pub fn preview(
        &self,
        request: &ConsolidationRequest,
        container: &Container,
        catalog: &dyn ItemCatalog,
    ) -> Result<Plan, ConsolidationError> {
        ensure_same_container(request, container)?;
        self.planner
            .plan_container(container, request.target_stack_size, catalog)
    }

    #[instrument(
        skip_all,
        fields(
            container = %request.container_id,
            actor = %request.actor,
            target = request.target_stack_size
        ),
        err
    )]
    pub fn consolidate(
        &self,
        request: &ConsolidationRequest,
        container: &mut Container,
        catalog: &dyn ItemCatalog,
        sink: &mut dyn OverflowSink,
    ) -> Result<ConsolidationResult, ConsolidationError> {
        let plan = self.preview(request, container, catalog)?;
        if plan.requires_overflow() {
            tracing::warn!(
                planned = plan.stacks().len(),
                capacity = container.capacity(),
                "layout exceeds container capacity"
            );
        }
        self.executor.apply(container, &plan, catalog, sink)
    }

    /// [`consolidate`](Self::consolidate), then publish the result's events.
    ///
    /// A publish failure is logged; it cannot undo the consolidation, so the
    /// result is still returned.
    pub fn consolidate_and_publish<B>(
        &self,
        request: &ConsolidationRequest,
        container: &mut Container,
        catalog: &dyn ItemCatalog,
        sink: &mut dyn OverflowSink,
        bus: &B,
    ) -> Result<ConsolidationResult, ConsolidationError>
    where
        B: EventBus<ConsolidationEvent> + ?Sized,
    {
        let result = self.consolidate(request, container, catalog, sink)?;
        for event in result.events(request) {
            if let Err(e) = bus.publish(event) {
                error!(container = %request.container_id, error = ?e, "failed to publish consolidation event");
            }
        }
        Ok(result)
    }
}

fn ensure_same_container(
    request: &ConsolidationRequest,
    container: &Container,
) -> Result<(), ConsolidationError> {
    if request.container_id != *container.id() {
        return Err(ConsolidationError::ContainerMismatch {
            requested: request.container_id,
            supplied: *container.id(),
        });
    }
    Ok(())
}
