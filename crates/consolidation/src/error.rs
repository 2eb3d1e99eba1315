use thiserror::Error;

use restack_core::ContainerId;
use restack_inventory::StackKey;

/// Whole-operation failures.
///
/// Every variant is raised before the container is touched, so the caller
/// can rely on the container being unchanged when one of these comes back.
/// Per-stack problems (materialization, overflow sink) never abort an
/// operation; they are recorded on the `ConsolidationResult` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsolidationError {
    #[error("target stack size {requested} is not allowed (allowed: {allowed:?})")]
    InvalidTargetSize { requested: u64, allowed: Vec<u64> },

    #[error("container {container} was modified after it was planned: {detail}")]
    ConcurrentModification { container: ContainerId, detail: String },

    #[error("request names container {requested} but container {supplied} was supplied")]
    ContainerMismatch {
        requested: ContainerId,
        supplied: ContainerId,
    },

    #[error("total quantity overflows at {key}")]
    QuantityOverflow { key: StackKey },
}

impl ConsolidationError {
    pub fn concurrent_modification(container: ContainerId, detail: impl Into<String>) -> Self {
        Self::ConcurrentModification {
            container,
            detail: detail.into(),
        }
    }
}
