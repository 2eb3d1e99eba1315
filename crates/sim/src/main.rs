//! `restack-sim`: run one consolidation from a JSON scenario and print the
//! outcome as JSON.
//!
//! ```text
//! restack-sim scenarios/cupboard_overflow.json
//! restack-sim < scenario.json
//! ```

mod scenario;

use std::io::Read;

use anyhow::Context;

use restack_consolidation::{ConsolidationConfig, ConsolidationEvent, ConsolidationRequest, ConsolidationService};
use restack_core::{ActorId, Entity};
use restack_events::{Event, EventBus, InMemoryEventBus};

use scenario::{Report, Scenario};

fn main() -> anyhow::Result<()> {
    restack_observability::init();

    let raw = match std::env::args().nth(1) {
        Some(path) if path != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read scenario {path}"))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read scenario from stdin")?;
            buf
        }
    };
    let scenario = Scenario::from_json(&raw).context("malformed scenario")?;

    let config = match &scenario.config {
        Some(config) => {
            config.validate()?;
            config.clone()
        }
        None => ConsolidationConfig::from_env(),
    };
    let service = ConsolidationService::new(config);

    let catalog = scenario.catalog();
    let mut container = scenario.container().context("scenario does not fit its container")?;
    let mut sink = scenario.sink();
    let bus = InMemoryEventBus::<ConsolidationEvent>::new();
    let events = bus.subscribe();

    let request = ConsolidationRequest::new(*container.id(), scenario.target_stack_size, ActorId::new());
    let result = service.consolidate_and_publish(&request, &mut container, &catalog, &mut sink, &bus)?;

    for event in events.drain() {
        tracing::info!(event_type = event.event_type(), "event published");
    }

    let report = Report {
        result: &result,
        layout: container.slots(),
        relocated_quantity: sink.relocated_quantity(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
