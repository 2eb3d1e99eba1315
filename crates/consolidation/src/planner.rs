//! Consolidation planner: pure layout computation.

use std::collections::BTreeMap;

use serde::Serialize;

use restack_core::{Entity, ExpectedVersion, ValueObject};
use restack_inventory::{Container, ItemCatalog, Stack, StackKey};

use crate::error::ConsolidationError;
use crate::policy::{StackSizePolicy, TargetStackSize};

/// One stack the executor will write back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStack {
    pub key: StackKey,
    pub quantity: u64,
}

/// Per-group summary: how a group's total is split.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedGroup {
    pub key: StackKey,
    pub total: u64,
    pub effective_max: u64,
    pub stack_count: usize,
}

/// Target layout for one container.
///
/// Groups (and therefore stacks) are ordered by item type, then variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    target: TargetStackSize,
    capacity: usize,
    #[serde(skip)]
    source_version: ExpectedVersion,
    groups: Vec<PlannedGroup>,
    stacks: Vec<PlannedStack>,
}

impl Plan {
    pub fn target(&self) -> TargetStackSize {
        self.target
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Container version the plan was computed from, when known.
    pub fn source_version(&self) -> ExpectedVersion {
        self.source_version
    }

    pub fn groups(&self) -> &[PlannedGroup] {
        &self.groups
    }

    /// Stacks in emission order.
    pub fn stacks(&self) -> &[PlannedStack] {
        &self.stacks
    }

    /// Checked when the plan is built, so the sum fits.
    pub fn total_quantity(&self) -> u64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    /// Whether the layout needs more slots than the container has.
    pub fn requires_overflow(&self) -> bool {
        self.stacks.len() > self.capacity
    }

    /// Planned totals per group, for comparing against live contents.
    pub fn totals(&self) -> BTreeMap<StackKey, u64> {
        self.groups.iter().map(|g| (g.key, g.total)).collect()
    }
}

impl ValueObject for Plan {}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    policy: StackSizePolicy,
}

impl Planner {
    pub fn new(policy: StackSizePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StackSizePolicy {
        &self.policy
    }

    /// Compute a layout for arbitrary stacks.
    ///
    /// The result carries no container version; an executor applying it only
    /// checks that the container still holds the same totals.
    pub fn plan(
        &self,
        stacks: &[Stack],
        target: u64,
        capacity: usize,
        catalog: &dyn ItemCatalog,
    ) -> Result<Plan, ConsolidationError> {
        let target = self.policy.validate(target)?;
        build(stacks, target, capacity, catalog, ExpectedVersion::Any)
    }

    /// Compute a layout from a container snapshot, pinned to its current version.
    pub fn plan_container(
        &self,
        container: &Container,
        target: u64,
        catalog: &dyn ItemCatalog,
    ) -> Result<Plan, ConsolidationError> {
        let target = self.policy.validate(target)?;
        let stacks: Vec<Stack> = container.stacks().cloned().collect();
        build(
            &stacks,
            target,
            container.capacity(),
            catalog,
            ExpectedVersion::Exact(container.version()),
        )
    }
}

/// Sum quantities per `(item type, variant)`; ordered by key.
pub fn group_totals<'a>(
    stacks: impl IntoIterator<Item = &'a Stack>,
) -> Result<BTreeMap<StackKey, u64>, ConsolidationError> {
    let mut totals = BTreeMap::new();
    for stack in stacks {
        let key = stack.key();
        let total: &mut u64 = totals.entry(key).or_insert(0);
        *total = total
            .checked_add(stack.quantity())
            .ok_or(ConsolidationError::QuantityOverflow { key })?;
    }
    Ok(totals)
}

fn build(
    stacks: &[Stack],
    target: TargetStackSize,
    capacity: usize,
    catalog: &dyn ItemCatalog,
    source_version: ExpectedVersion,
) -> Result<Plan, ConsolidationError> {
    let mut groups = Vec::new();
    let mut planned = Vec::new();
    let mut grand_total: u64 = 0;

    for (key, total) in group_totals(stacks)? {
        grand_total = grand_total
            .checked_add(total)
            .ok_or(ConsolidationError::QuantityOverflow { key })?;

        let effective_max = catalog.max_stack(key.item_type).effective(target.get());
        let full = total / effective_max;
        let remainder = total % effective_max;

        let before = planned.len();
        for _ in 0..full {
            planned.push(PlannedStack {
                key,
                quantity: effective_max,
            });
        }
        if remainder > 0 {
            planned.push(PlannedStack {
                key,
                quantity: remainder,
            });
        }

        groups.push(PlannedGroup {
            key,
            total,
            effective_max,
            stack_count: planned.len() - before,
        });
    }

    Ok(Plan {
        target,
        capacity,
        source_version,
        groups,
        stacks: planned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use restack_core::{ContainerId, ItemTypeId, Variant};
    use restack_inventory::{InMemoryCatalog, ItemType, StackLimit};

    const WOOD: ItemTypeId = ItemTypeId(69);
    const METAL: ItemTypeId = ItemTypeId(-151);
    const SULFUR: ItemTypeId = ItemTypeId(-891);

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_item_type(ItemType::new(WOOD, "Wood", StackLimit::bounded(10_000)))
            .with_item_type(ItemType::new(METAL, "Metal Fragments", StackLimit::bounded(1000)))
            .with_item_type(ItemType::new(SULFUR, "Sulfur", StackLimit::Unbounded))
    }

    fn stack(item: ItemTypeId, variant: u64, quantity: u64) -> Stack {
        Stack::new(item, Variant(variant), quantity).unwrap()
    }

    fn quantities(plan: &Plan) -> Vec<u64> {
        plan.stacks().iter().map(|s| s.quantity).collect()
    }

    #[test]
    fn splits_into_full_stacks_plus_remainder() {
        let stacks = vec![stack(WOOD, 0, 10_000), stack(WOOD, 0, 2500)];
        let plan = Planner::default().plan(&stacks, 5000, 30, &catalog()).unwrap();

        assert_eq!(quantities(&plan), vec![5000, 5000, 2500]);
        assert_eq!(plan.groups()[0].effective_max, 5000);
        assert_eq!(plan.groups()[0].stack_count, 3);
    }

    #[test]
    fn exact_multiple_has_no_remainder_stack() {
        let plan = Planner::default()
            .plan(&[stack(WOOD, 0, 6000)], 3000, 30, &catalog())
            .unwrap();
        assert_eq!(quantities(&plan), vec![3000, 3000]);
    }

    #[test]
    fn item_max_caps_the_target() {
        let plan = Planner::default()
            .plan(&[stack(METAL, 0, 2500)], 2000, 30, &catalog())
            .unwrap();
        assert_eq!(quantities(&plan), vec![1000, 1000, 500]);
    }

    #[test]
    fn unbounded_and_unknown_types_use_the_target() {
        let stacks = vec![stack(SULFUR, 0, 4500), stack(ItemTypeId(7), 0, 4500)];
        let plan = Planner::default().plan(&stacks, 4000, 30, &catalog()).unwrap();
        assert_eq!(quantities(&plan), vec![4000, 500, 4000, 500]);
    }

    #[test]
    fn variants_are_never_merged() {
        let stacks = vec![stack(WOOD, 0, 100), stack(WOOD, 7, 100), stack(WOOD, 0, 50)];
        let plan = Planner::default().plan(&stacks, 2000, 30, &catalog()).unwrap();

        assert_eq!(plan.groups().len(), 2);
        assert_eq!(
            plan.stacks(),
            &[
                PlannedStack { key: StackKey::new(WOOD, Variant(0)), quantity: 150 },
                PlannedStack { key: StackKey::new(WOOD, Variant(7)), quantity: 100 },
            ]
        );
    }

    #[test]
    fn groups_are_ordered_by_item_then_variant() {
        let stacks = vec![stack(WOOD, 2, 1), stack(METAL, 0, 1), stack(WOOD, 1, 1)];
        let plan = Planner::default().plan(&stacks, 2000, 30, &catalog()).unwrap();
        let keys: Vec<_> = plan.groups().iter().map(|g| g.key).collect();
        assert_eq!(
            keys,
            vec![
                StackKey::new(METAL, Variant(0)),
                StackKey::new(WOOD, Variant(1)),
                StackKey::new(WOOD, Variant(2)),
            ]
        );
    }

    #[test]
    fn disallowed_target_is_rejected() {
        let err = Planner::default()
            .plan(&[stack(WOOD, 0, 1)], 1234, 30, &catalog())
            .unwrap_err();
        assert!(matches!(err, ConsolidationError::InvalidTargetSize { requested: 1234, .. }));
    }

    #[test]
    fn overflow_hint_compares_stack_count_to_capacity() {
        let stacks = vec![stack(WOOD, 0, 100), stack(METAL, 0, 100), stack(SULFUR, 0, 100)];
        let planner = Planner::default();
        assert!(planner.plan(&stacks, 2000, 2, &catalog()).unwrap().requires_overflow());
        assert!(!planner.plan(&stacks, 2000, 3, &catalog()).unwrap().requires_overflow());
    }

    #[test]
    fn container_plans_pin_the_version() {
        let mut container = Container::new(ContainerId::new(), 4).unwrap();
        container.insert(stack(WOOD, 0, 10)).unwrap();
        container.insert(stack(WOOD, 0, 10)).unwrap();

        let plan = Planner::default()
            .plan_container(&container, 2000, &catalog())
            .unwrap();

        assert_eq!(plan.source_version(), ExpectedVersion::Exact(2));
        assert_eq!(plan.capacity(), 4);
        assert_eq!(quantities(&plan), vec![20]);
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        let plan = Planner::default().plan(&[], 2000, 1, &catalog()).unwrap();
        assert!(plan.stacks().is_empty());
        assert!(!plan.requires_overflow());
    }

    #[test]
    fn overflowing_group_total_is_rejected() {
        let stacks = [stack(WOOD, 0, u64::MAX), stack(WOOD, 0, 1)];

        let err = Planner::default().plan(&stacks, 2000, 30, &catalog()).unwrap_err();

        assert_eq!(
            err,
            ConsolidationError::QuantityOverflow {
                key: StackKey::new(WOOD, Variant::DEFAULT)
            }
        );
    }

    #[test]
    fn overflowing_total_across_groups_is_rejected() {
        let stacks = [stack(WOOD, 0, u64::MAX), stack(METAL, 0, 1)];

        let err = Planner::default().plan(&stacks, 2000, 30, &catalog()).unwrap_err();

        assert!(matches!(err, ConsolidationError::QuantityOverflow { .. }));
    }

    fn arb_stacks() -> impl Strategy<Value = Vec<Stack>> {
        let item = prop_oneof![Just(WOOD), Just(METAL), Just(SULFUR), Just(ItemTypeId(7))];
        prop::collection::vec((item, 0u64..3, 1u64..25_000), 0..40).prop_map(|raw| {
            raw.into_iter()
                .map(|(item, variant, quantity)| stack(item, variant, quantity))
                .collect()
        })
    }

    fn arb_target() -> impl Strategy<Value = u64> {
        prop::sample::select(vec![2000u64, 3000, 4000, 5000])
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 500,
            ..ProptestConfig::default()
        })]

        /// Property: every group's planned quantity equals its input total.
        #[test]
        fn plan_conserves_quantity(stacks in arb_stacks(), target in arb_target()) {
            let plan = Planner::default().plan(&stacks, target, 30, &catalog()).unwrap();
            let planned = group_totals(
                &plan.stacks().iter()
                    .map(|p| Stack::with_key(p.key, p.quantity).unwrap())
                    .collect::<Vec<_>>(),
            )
            .unwrap();
            prop_assert_eq!(planned, group_totals(&stacks).unwrap());
        }

        /// Property: no stack exceeds min(target, max stack).
        #[test]
        fn plan_respects_stack_bound(stacks in arb_stacks(), target in arb_target()) {
            let catalog = catalog();
            let plan = Planner::default().plan(&stacks, target, 30, &catalog).unwrap();
            for planned in plan.stacks() {
                let bound = catalog.max_stack(planned.key.item_type).effective(target);
                prop_assert!(planned.quantity >= 1);
                prop_assert!(planned.quantity <= bound);
            }
        }

        /// Property: each group uses ceil(total / effective_max) stacks.
        #[test]
        fn plan_is_minimal(stacks in arb_stacks(), target in arb_target()) {
            let plan = Planner::default().plan(&stacks, target, 30, &catalog()).unwrap();
            for group in plan.groups() {
                prop_assert_eq!(group.stack_count as u64, group.total.div_ceil(group.effective_max));
            }
        }

        /// Property: slot order of the input does not change the plan.
        #[test]
        fn plan_ignores_input_order(stacks in arb_stacks(), target in arb_target()) {
            let mut reversed = stacks.clone();
            reversed.reverse();
            let planner = Planner::default();
            prop_assert_eq!(
                planner.plan(&stacks, target, 30, &catalog()).unwrap(),
                planner.plan(&reversed, target, 30, &catalog()).unwrap()
            );
        }
    }
}
