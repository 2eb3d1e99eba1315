//! Event contract and in-process pub/sub used to report consolidation
//! outcomes to the host (chat replies, UI refresh, audit logs).

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
