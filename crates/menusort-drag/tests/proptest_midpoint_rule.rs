//! Property-based tests for the midpoint hit-test rule.
//!
//! 1. The insertion index never decreases as the pointer moves down a list
//! 2. The index is bounded by the sibling count
//! 3. Anywhere over the active entity's own region maps to its current slot

use menusort_core::{Axis, ContainerId, EntityId, Point, Rect};
use menusort_drag::{DropKind, HitTestOptions, RegionTable, resolve_drop_target};
use proptest::prelude::*;

const LIST: ContainerId = ContainerId(1);

const INSERT_ONLY: HitTestOptions = HitTestOptions {
    axis: Axis::Vertical,
    swap_on_entity_hover: false,
};

/// Rows as (height, gap-after) pairs, stacked from y = 0.
fn rows() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((1i32..40, 0i32..10), 1..20)
}

fn layout(rows: &[(i32, i32)]) -> (RegionTable, i32) {
    let mut t = RegionTable::new();
    let mut y = 0;
    let mut bounds = Vec::with_capacity(rows.len());
    for &(height, gap) in rows {
        bounds.push(Rect::new(0, y, 100, height));
        y += height + gap;
    }
    t.register_container(LIST, Rect::new(0, 0, 100, y.max(1)));
    for (i, rect) in bounds.into_iter().enumerate() {
        t.register_entity(EntityId(i as u64 + 1), LIST, rect);
    }
    (t, y.max(1))
}

fn index_at(t: &RegionTable, active: EntityId, y: i32) -> usize {
    let target = resolve_drop_target(t, active, LIST, Point::new(10, y), INSERT_ONLY)
        .expect("pointer is inside the list");
    assert_eq!(target.kind, DropKind::Insert);
    target.index
}

proptest! {
    #[test]
    fn index_is_monotonic_in_pointer_y(
        rows in rows(),
        pick in any::<prop::sample::Index>(),
        a in 0u32..10_000,
        b in 0u32..10_000,
    ) {
        let (t, height) = layout(&rows);
        let active = EntityId(pick.index(rows.len()) as u64 + 1);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let y1 = (lo % height as u32) as i32;
        let y2 = (hi % height as u32) as i32;
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };

        let first = index_at(&t, active, y1);
        let second = index_at(&t, active, y2);
        prop_assert!(first <= second, "index fell from {first} to {second} moving {y1} -> {y2}");
        prop_assert!(second < rows.len(), "index {second} exceeds {} siblings", rows.len() - 1);
    }

    #[test]
    fn own_region_maps_to_current_slot(
        rows in rows(),
        pick in any::<prop::sample::Index>(),
        offset in any::<prop::sample::Index>(),
    ) {
        let (t, _) = layout(&rows);
        let slot = pick.index(rows.len());
        let active = EntityId(slot as u64 + 1);
        let own = t.region_of(active).expect("registered").bounds;
        let y = own.y + offset.index(own.height as usize) as i32;

        prop_assert_eq!(index_at(&t, active, y), slot);
    }
}
