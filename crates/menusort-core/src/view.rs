#![forbid(unsafe_code)]

//! Display order of one container's entities.
//!
//! [`OrderedView`] sorts by `position` ascending with `id` ascending as the
//! tie-break. It holds no state beyond the sorted copy and is rebuilt
//! whenever the underlying entities change.

use crate::allocator::CurrentSlot;
use crate::entity::{ContainerId, EntityId, OrderedEntity};

/// Entities of a single container in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderedView {
    entries: Vec<OrderedEntity>,
}

impl OrderedView {
    /// Build a view from entities in any order.
    #[must_use]
    pub fn new(entities: impl IntoIterator<Item = OrderedEntity>) -> Self {
        let mut entries: Vec<OrderedEntity> = entities.into_iter().collect();
        entries.sort_by_key(OrderedEntity::order_key);
        Self { entries }
    }

    /// Build a view of only the entities whose parent is `container`.
    #[must_use]
    pub fn of_container<'a>(
        container: ContainerId,
        entities: impl IntoIterator<Item = &'a OrderedEntity>,
    ) -> Self {
        Self::new(
            entities
                .into_iter()
                .filter(|e| e.parent_id == container)
                .copied(),
        )
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[OrderedEntity] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderedEntity> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&OrderedEntity> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Display index of `id`.
    #[must_use]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Positions in display order (ascending).
    #[must_use]
    pub fn positions(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.position).collect()
    }

    /// The view with `id` removed: the siblings a moving entity is placed among.
    #[must_use]
    pub fn without(&self, id: EntityId) -> Self {
        Self {
            entries: self.entries.iter().filter(|e| e.id != id).copied().collect(),
        }
    }

    /// Current slot of `id` for no-op detection.
    #[must_use]
    pub fn slot_of(&self, id: EntityId) -> Option<CurrentSlot> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.id == id)
            .map(|(index, e)| CurrentSlot {
                index,
                position: e.position,
            })
    }

    /// Entities on either side of insertion slot `index`.
    #[must_use]
    pub fn neighbors(&self, index: usize) -> (Option<&OrderedEntity>, Option<&OrderedEntity>) {
        let before = index.checked_sub(1).and_then(|i| self.entries.get(i));
        (before, self.entries.get(index))
    }

    /// Whether all positions are distinct, so order does not depend on ids.
    #[must_use]
    pub fn is_strictly_ordered(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].position < pair[1].position)
    }
}

impl<'a> IntoIterator for &'a OrderedView {
    type Item = &'a OrderedEntity;
    type IntoIter = std::slice::Iter<'a, OrderedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u64, position: i64) -> OrderedEntity {
        OrderedEntity::new(EntityId(id), ContainerId(1), position)
    }

    #[test]
    fn sorts_by_position_then_id() {
        let view = OrderedView::new([e(3, 10), e(2, 5), e(1, 10), e(4, -1)]);
        assert_eq!(
            view.ids(),
            vec![EntityId(4), EntityId(2), EntityId(1), EntityId(3)]
        );
        assert!(!view.is_strictly_ordered());
    }

    #[test]
    fn of_container_filters_parent() {
        let other = OrderedEntity::new(EntityId(9), ContainerId(2), 0);
        let all = [e(1, 1), other, e(2, 0)];
        let view = OrderedView::of_container(ContainerId(1), all.iter());
        assert_eq!(view.ids(), vec![EntityId(2), EntityId(1)]);
    }

    #[test]
    fn without_and_slot() {
        let view = OrderedView::new([e(1, 1), e(2, 2), e(3, 3)]);
        assert_eq!(view.without(EntityId(2)).positions(), vec![1, 3]);
        assert_eq!(
            view.slot_of(EntityId(3)),
            Some(CurrentSlot {
                index: 2,
                position: 3
            })
        );
        assert_eq!(view.slot_of(EntityId(7)), None);
    }

    #[test]
    fn neighbors_at_edges() {
        let view = OrderedView::new([e(1, 1), e(2, 2)]);
        let (before, after) = view.neighbors(0);
        assert!(before.is_none());
        assert_eq!(after.map(|x| x.id), Some(EntityId(1)));
        let (before, after) = view.neighbors(2);
        assert_eq!(before.map(|x| x.id), Some(EntityId(2)));
        assert!(after.is_none());
    }
}
