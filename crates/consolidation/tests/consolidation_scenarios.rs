//! End-to-end consolidation scenarios through the public service API.

use restack_consolidation::{
    ConsolidationConfig, ConsolidationError, ConsolidationRequest, ConsolidationService,
    DiversionReason, Outcome, Planner, RecordingSink, SinkOutcome,
};
use restack_core::{ActorId, ContainerId, Entity, ItemTypeId, Variant};
use restack_inventory::{Container, InMemoryCatalog, ItemType, Position, Stack, StackKey, StackLimit};

const WOOD: ItemTypeId = ItemTypeId(-151);
const STONE: ItemTypeId = ItemTypeId(-2099);
const CLOTH: ItemTypeId = ItemTypeId(-858);
const SULFUR: ItemTypeId = ItemTypeId(-891);

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_item_type(ItemType::new(WOOD, "Wood", StackLimit::bounded(1000)))
        .with_item_type(ItemType::new(STONE, "Stones", StackLimit::bounded(1000)))
        .with_item_type(ItemType::new(CLOTH, "Cloth", StackLimit::bounded(1000)))
        .with_item_type(ItemType::new(SULFUR, "Sulfur", StackLimit::bounded(10_000)))
}

fn stack(item: ItemTypeId, quantity: u64) -> Stack {
    Stack::new(item, Variant::DEFAULT, quantity).unwrap()
}

fn cupboard(capacity: usize, stacks: &[Stack]) -> Container {
    let mut container = Container::new(ContainerId::new(), capacity)
        .unwrap()
        .with_position(Position::new(120.0, 14.5, -40.0));
    for s in stacks {
        container.insert(s.clone()).unwrap();
    }
    container
}

fn request(container: &Container, target: u64) -> ConsolidationRequest {
    ConsolidationRequest::new(*container.id(), target, ActorId::new())
}

#[test]
fn disallowed_target_leaves_container_untouched() {
    let service = ConsolidationService::default();
    let mut container = cupboard(6, &[stack(WOOD, 700), stack(WOOD, 300), stack(STONE, 5)]);
    let before = container.clone();
    let mut sink = RecordingSink::new();

    let err = service
        .consolidate(&request(&container, 1234), &mut container, &catalog(), &mut sink)
        .unwrap_err();

    assert!(matches!(err, ConsolidationError::InvalidTargetSize { requested: 1234, .. }));
    assert_eq!(container, before);
    assert_eq!(sink.attempts(), 0);
}

#[test]
fn three_single_stack_groups_into_two_slots() {
    // Planner half: three distinct types of 100 each, two slots.
    let stacks = [stack(WOOD, 100), stack(STONE, 100), stack(CLOTH, 100)];
    let plan = Planner::default().plan(&stacks, 2000, 2, &catalog()).unwrap();
    assert_eq!(plan.stacks().len(), 3);
    assert!(plan.stacks().iter().all(|p| p.quantity == 100));
    assert!(plan.requires_overflow());

    // Executor half: a two-slot container whose layout also needs three stacks.
    let service = ConsolidationService::default();
    let mut container = cupboard(2, &[stack(STONE, 100), stack(WOOD, 1100)]);
    let mut sink = RecordingSink::new();

    let result = service
        .consolidate(&request(&container, 2000), &mut container, &catalog(), &mut sink)
        .unwrap();

    assert_eq!(result.outcome(), Outcome::Partial);
    assert_eq!(container.slots_used(), 2);
    assert_eq!(result.diverted().len(), 1);
    let diversion = &result.diverted()[0];
    assert_eq!(diversion.quantity, 100);
    assert_eq!(diversion.reason, DiversionReason::CapacityExhausted);
    assert_eq!(diversion.sink, SinkOutcome::Relocated);
    assert_eq!(sink.relocated()[0].hint.position, Position::new(120.0, 15.5, -40.0));
}

#[test]
fn large_group_splits_at_target_below_item_maximum() {
    let service = ConsolidationService::default();
    let mut container = cupboard(
        10,
        &[stack(SULFUR, 4000), stack(SULFUR, 4000), stack(SULFUR, 4000), stack(SULFUR, 500)],
    );

    let result = service
        .consolidate(&request(&container, 5000), &mut container, &catalog(), &mut RecordingSink::new())
        .unwrap();

    assert!(result.is_success());
    let layout: Vec<u64> = container.stacks().map(Stack::quantity).collect();
    assert_eq!(layout, vec![5000, 5000, 2500]);
}

#[test]
fn already_consolidated_container_keeps_its_layout() {
    let service = ConsolidationService::default();
    let catalog = catalog();
    let mut container = cupboard(
        12,
        &[stack(WOOD, 640), stack(CLOTH, 90), stack(WOOD, 999), stack(SULFUR, 7000), stack(STONE, 1)],
    );

    service
        .consolidate(&request(&container, 3000), &mut container, &catalog, &mut RecordingSink::new())
        .unwrap();
    let first: Vec<Option<Stack>> = container.slots().to_vec();

    let again = service
        .consolidate(&request(&container, 3000), &mut container, &catalog, &mut RecordingSink::new())
        .unwrap();

    assert!(again.is_success());
    assert_eq!(container.slots(), first.as_slice());
}

#[test]
fn variants_stay_separate_through_consolidation() {
    let service = ConsolidationService::default();
    let skinned = Stack::new(WOOD, Variant(10_086), 40).unwrap();
    let mut container = cupboard(5, &[stack(WOOD, 60), skinned.clone(), stack(WOOD, 40)]);

    service
        .consolidate(&request(&container, 2000), &mut container, &catalog(), &mut RecordingSink::new())
        .unwrap();

    assert_eq!(container.slots_used(), 2);
    assert_eq!(container.quantity_of(StackKey::new(WOOD, Variant::DEFAULT)), 100);
    assert_eq!(container.quantity_of(skinned.key()), 40);
}

#[test]
fn failures_are_reported_with_quantities() {
    let service = ConsolidationService::new(ConsolidationConfig::default());
    let catalog = catalog();
    let mut container = cupboard(2, &[stack(CLOTH, 30), stack(STONE, 2500)]);
    let mut sink = RecordingSink::new().fail_for(STONE, "no valid surface");

    let result = service
        .consolidate(&request(&container, 2000), &mut container, &catalog, &mut sink)
        .unwrap();

    // stone 1000 | stone 1000 fill both slots; stone 500 and cloth 30 overflow,
    // and only the cloth drop succeeds.
    assert_eq!(result.outcome(), Outcome::Partial);
    assert_eq!(container.total_quantity(), 2000);
    assert_eq!(result.diverted_quantity(), 530);
    assert_eq!(result.lost_quantity(), 500);
    assert_eq!(sink.relocated_quantity(), 30);
    assert_eq!(container.total_quantity() + result.diverted_quantity(), 2530);
}
