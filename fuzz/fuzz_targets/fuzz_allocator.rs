#![no_main]

use menusort_core::allocator::{Allocation, allocate, allocate_move, renumber};
use menusort_core::{ContainerId, EntityId, OrderedEntity, OrderedView};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the slot; the rest are little-endian i64 positions,
    // which reach the extremes of the integer range.
    let Some((&slot, rest)) = data.split_first() else {
        return;
    };
    let mut siblings: Vec<i64> = rest
        .chunks_exact(8)
        .take(64)
        .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    siblings.sort_unstable();
    let index = usize::from(slot) % (siblings.len() + 1);

    match allocate(&siblings, index, 0) {
        Allocation::At(p) => {
            assert!(!siblings.contains(&p), "allocated an occupied position");
            if index > 0 {
                assert!(p > siblings[index - 1]);
            }
            if index < siblings.len() {
                assert!(p < siblings[index]);
            }
        }
        Allocation::Exhausted => {}
        Allocation::Unchanged => panic!("allocate reported Unchanged"),
    }

    // Moving an entity to its own slot is always a no-op.
    let view = OrderedView::new(
        siblings
            .iter()
            .enumerate()
            .map(|(i, &p)| OrderedEntity::new(EntityId(i as u64), ContainerId(0), p)),
    );
    if let Some(first) = view.entries().first() {
        let rest = view.without(first.id);
        let slot = view.slot_of(first.id);
        assert_eq!(
            allocate_move(&rest.positions(), 0, slot, 0),
            Allocation::Unchanged
        );
    }

    // Renumbering keeps order and always reopens the slot.
    let fresh = renumber(view.ids(), 1000, 0);
    assert!(fresh.windows(2).all(|w| w[0].1 < w[1].1));
    let positions: Vec<i64> = fresh.iter().map(|(_, p)| *p).collect();
    assert!(matches!(allocate(&positions, index, 0), Allocation::At(_)));
});
