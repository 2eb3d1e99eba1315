//! `restack-consolidation`: re-partitions a container's contents into
//! uniformly sized stacks.
//!
//! Control flow for one request:
//!
//! ```text
//! ConsolidationRequest → StackSizePolicy (allow-list)
//!                      → Planner (pure: group, bound, partition)
//!                      → Executor (drain, re-insert, divert overflow)
//!                      → ConsolidationResult (+ events for the host)
//! ```
//!
//! Quantity is never created or destroyed: for every item type and variant,
//! input equals written plus diverted. Diverted quantity always goes through
//! the host's [`OverflowSink`], and a failed sink call is recorded on the
//! result rather than retried.

pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod planner;
pub mod policy;
pub mod request;
pub mod result;
pub mod service;
pub mod sink;

pub use config::{ConfigError, ConsolidationConfig};
pub use error::ConsolidationError;
pub use events::ConsolidationEvent;
pub use executor::Executor;
pub use planner::{Plan, PlannedGroup, PlannedStack, Planner};
pub use policy::{StackSizePolicy, TargetStackSize};
pub use request::ConsolidationRequest;
pub use result::{ConsolidationResult, Diversion, DiversionReason, Outcome, SinkOutcome, WrittenStack};
pub use service::ConsolidationService;
pub use sink::{LocationHint, OverflowSink, RecordingSink, Relocation, SinkFailure};
