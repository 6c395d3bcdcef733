#![forbid(unsafe_code)]

//! In-memory [`EntityStore`] with failure injection.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use menusort_core::allocator::{DEFAULT_BASELINE, append_position};
use menusort_core::{ContainerId, EntityId, EntityPatch, OrderedEntity, OrderedView};

use crate::error::StoreError;
use crate::store::EntityStore;

#[derive(Debug, Default)]
struct MemoryState {
    entities: BTreeMap<EntityId, OrderedEntity>,
    failing: BTreeSet<EntityId>,
    updates: Vec<(EntityId, EntityPatch)>,
}

/// Thread-safe store keeping entities in a map.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    baseline: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_baseline(DEFAULT_BASELINE)
    }

    /// Store whose first entity in an empty container gets `baseline`.
    #[must_use]
    pub fn with_baseline(baseline: i64) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            baseline,
        }
    }

    /// Store seeded with `entities`.
    #[must_use]
    pub fn seeded(entities: impl IntoIterator<Item = OrderedEntity>) -> Self {
        let store = Self::new();
        for entity in entities {
            store.insert(entity);
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or overwrite an entity without going through `update_entity`.
    pub fn insert(&self, entity: OrderedEntity) {
        self.lock().entities.insert(entity.id, entity);
    }

    pub fn remove(&self, id: EntityId) -> Option<OrderedEntity> {
        self.lock().entities.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<OrderedEntity> {
        self.lock().entities.get(&id).copied()
    }

    /// Make every update of `id` fail with a transport error.
    pub fn fail_updates_for(&self, id: EntityId) {
        self.lock().failing.insert(id);
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Updates received so far, successful or not, in arrival order.
    #[must_use]
    pub fn update_log(&self) -> Vec<(EntityId, EntityPatch)> {
        self.lock().updates.clone()
    }

    #[must_use]
    pub fn update_count(&self) -> usize {
        self.lock().updates.len()
    }

    /// Display order of `parent` as stored.
    #[must_use]
    pub fn view(&self, parent: ContainerId) -> OrderedView {
        OrderedView::of_container(parent, self.lock().entities.values())
    }
}

impl EntityStore for MemoryStore {
    fn list_siblings(&self, parent: ContainerId) -> Result<Vec<OrderedEntity>, StoreError> {
        Ok(self.view(parent).entries().to_vec())
    }

    fn update_entity(
        &self,
        id: EntityId,
        patch: EntityPatch,
    ) -> Result<OrderedEntity, StoreError> {
        let mut state = self.lock();
        state.updates.push((id, patch));
        if state.failing.contains(&id) {
            return Err(StoreError::Transport(format!("injected failure for {id}")));
        }
        if patch.is_empty() {
            return Err(StoreError::Validation("empty patch".into()));
        }
        let entity = state.entities.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *entity = patch.apply(*entity);
        Ok(*entity)
    }

    fn create_entity(&self, parent: ContainerId) -> Result<OrderedEntity, StoreError> {
        let mut state = self.lock();
        let next = match state.entities.keys().next_back() {
            Some(last) => last.0.checked_add(1),
            None => Some(1),
        };
        let id = EntityId(next.ok_or_else(|| StoreError::Validation("entity ids exhausted".into()))?);
        let position = append_position(
            state
                .entities
                .values()
                .filter(|e| e.parent_id == parent)
                .map(|e| e.position),
            self.baseline,
        );
        let entity = OrderedEntity::new(id, parent, position);
        state.entities.insert(id, entity);
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_appends_to_end() {
        let store = MemoryStore::new();
        let a = store.create_entity(ContainerId(1)).unwrap();
        let b = store.create_entity(ContainerId(1)).unwrap();
        let other = store.create_entity(ContainerId(2)).unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
        assert_eq!(other.position, 0);
        assert!(b.id > a.id);
        assert_eq!(
            store.list_siblings(ContainerId(1)).unwrap(),
            vec![a, b]
        );
    }

    #[test]
    fn create_fails_once_ids_run_out() {
        let store =
            MemoryStore::seeded([OrderedEntity::new(EntityId(u64::MAX), ContainerId(1), 0)]);
        let err = store.create_entity(ContainerId(1)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "{err:?}");
        assert_eq!(store.list_siblings(ContainerId(1)).unwrap().len(), 1);
    }

    #[test]
    fn update_applies_patch() {
        let store = MemoryStore::seeded([OrderedEntity::new(EntityId(1), ContainerId(1), 5)]);
        let moved = store
            .update_entity(EntityId(1), EntityPatch::relocate(ContainerId(2), 9))
            .unwrap();
        assert_eq!(moved, OrderedEntity::new(EntityId(1), ContainerId(2), 9));
        assert!(store.list_siblings(ContainerId(1)).unwrap().is_empty());
    }

    #[test]
    fn injected_failures_and_missing_entities() {
        let store = MemoryStore::seeded([OrderedEntity::new(EntityId(1), ContainerId(1), 5)]);
        store.fail_updates_for(EntityId(1));
        assert!(matches!(
            store.update_entity(EntityId(1), EntityPatch::position(1)),
            Err(StoreError::Transport(_))
        ));
        assert_eq!(store.get(EntityId(1)).map(|e| e.position), Some(5));
        assert_eq!(
            store.update_entity(EntityId(2), EntityPatch::position(1)),
            Err(StoreError::NotFound(EntityId(2)))
        );
        assert_eq!(store.update_count(), 2);
    }
}
