//! Property tests: any drop leaves the store in exactly the requested order.
//!
//! 1. The moved entity ends up at the requested slot; others keep their
//!    relative order
//! 2. Positions stay unique (the order is total without the id tie-break)
//! 3. Only the moved entity is written unless a renumbering pass ran
//! 4. The optimistic cache agrees with the store after settlement

use menusort_core::{ContainerId, EntityId, OrderedEntity, ReorderConfig};
use menusort_drag::{DropIntent, DropKind};
use menusort_sync::{MemoryStore, MutationDispatcher, Settlement};
use proptest::prelude::*;

const MENU: ContainerId = ContainerId(1);

// Dense positions so that renumbering happens often.
fn positions() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(-40i64..40, 1..12).prop_map(|set| set.into_iter().collect())
}

fn expected_order(ids: &[EntityId], moving: EntityId, index: usize) -> Vec<EntityId> {
    let mut order: Vec<EntityId> = ids.iter().copied().filter(|id| *id != moving).collect();
    order.insert(index.min(order.len()), moving);
    order
}

proptest! {
    #[test]
    fn drop_realizes_requested_order(
        positions in positions(),
        pick in any::<prop::sample::Index>(),
        index in 0usize..14,
        stride in 2i64..2000,
    ) {
        let entities: Vec<OrderedEntity> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| OrderedEntity::new(EntityId(i as u64 + 1), MENU, p))
            .collect();
        let ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
        let moving = ids[pick.index(ids.len())];

        let store = MemoryStore::seeded(entities.iter().copied());
        let mut dispatcher = MutationDispatcher::new(ReorderConfig {
            renumber_stride: stride,
            ..ReorderConfig::default()
        });
        dispatcher.load(MENU, entities.iter().copied());

        let settlement = dispatcher.run(&store, DropIntent {
            entity: moving,
            source: MENU,
            target: MENU,
            index,
            kind: DropKind::Insert,
        });

        let Settlement::Applied { mutations, renumbered, .. } = settlement else {
            return Err(TestCaseError::fail(format!("unexpected {settlement:?}")));
        };
        let stored = store.view(MENU);
        prop_assert_eq!(stored.ids(), expected_order(&ids, moving, index));
        prop_assert!(stored.is_strictly_ordered());
        if !renumbered {
            prop_assert!(mutations <= 1);
            prop_assert!(store.update_log().iter().all(|(id, _)| *id == moving));
        }
        prop_assert_eq!(dispatcher.view(MENU).map(|v| v.ids()), Some(stored.ids()));
    }
}
