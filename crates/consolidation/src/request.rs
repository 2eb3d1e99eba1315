use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use restack_core::{ActorId, ContainerId};

/// Inbound request, issued by a UI action or command handler.
///
/// `target_stack_size` is unchecked here; the service validates it against
/// the configured allow-list before touching the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationRequest {
    pub container_id: ContainerId,
    pub target_stack_size: u64,
    pub actor: ActorId,
    pub occurred_at: DateTime<Utc>,
}

impl ConsolidationRequest {
    pub fn new(container_id: ContainerId, target_stack_size: u64, actor: ActorId) -> Self {
        Self {
            container_id,
            target_stack_size,
            actor,
            occurred_at: Utc::now(),
        }
    }
}
