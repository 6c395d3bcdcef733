#![forbid(unsafe_code)]

//! Client-side cache of container display orders.
//!
//! The dispatcher writes optimistic state here on drop and restores a
//! [`CacheSnapshot`] if persistence fails. A container marked stale should be
//! refetched with `list_siblings` and [`OrderedCache::load`]ed again; its
//! cached order stays readable meanwhile.

use ahash::AHashMap;
use menusort_core::{ContainerId, EntityId, OrderedEntity, OrderedView};

#[derive(Debug, Clone, Default)]
struct CachedContainer {
    view: OrderedView,
    stale: bool,
}

/// Captured state of some containers, for reverting optimistic updates.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    containers: Vec<(ContainerId, Option<OrderedView>)>,
}

impl CacheSnapshot {
    #[must_use]
    pub fn containers(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.containers.iter().map(|(id, _)| *id)
    }
}

/// Display order per loaded container.
#[derive(Debug, Clone, Default)]
pub struct OrderedCache {
    containers: AHashMap<ContainerId, CachedContainer>,
}

impl OrderedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a container's contents with authoritative data.
    pub fn load(&mut self, container: ContainerId, entities: impl IntoIterator<Item = OrderedEntity>) {
        let view = OrderedView::new(entities.into_iter().filter(|e| e.parent_id == container));
        self.containers
            .insert(container, CachedContainer { view, stale: false });
    }

    #[must_use]
    pub fn is_loaded(&self, container: ContainerId) -> bool {
        self.containers.contains_key(&container)
    }

    #[must_use]
    pub fn view(&self, container: ContainerId) -> Option<&OrderedView> {
        self.containers.get(&container).map(|c| &c.view)
    }

    /// Locate an entity in any loaded container.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<OrderedEntity> {
        self.containers
            .values()
            .find_map(|c| c.view.get(id).copied())
    }

    /// Write an entity's current state, moving it between containers when
    /// its parent changed. Unloaded target containers are left unloaded.
    pub fn apply_entity(&mut self, entity: OrderedEntity) {
        for (id, cached) in &mut self.containers {
            if *id != entity.parent_id && cached.view.get(entity.id).is_some() {
                cached.view = cached.view.without(entity.id);
            }
        }
        if let Some(cached) = self.containers.get_mut(&entity.parent_id) {
            let others = cached.view.without(entity.id);
            cached.view = OrderedView::new(others.iter().copied().chain(std::iter::once(entity)));
        }
    }

    /// Capture the given containers (including "not loaded").
    #[must_use]
    pub fn snapshot(&self, containers: &[ContainerId]) -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::default();
        for &id in containers {
            if snapshot.containers.iter().any(|(c, _)| *c == id) {
                continue;
            }
            snapshot
                .containers
                .push((id, self.containers.get(&id).map(|c| c.view.clone())));
        }
        snapshot
    }

    /// Put captured containers back as they were.
    pub fn restore(&mut self, snapshot: &CacheSnapshot) {
        for (id, view) in &snapshot.containers {
            match view {
                Some(view) => {
                    let stale = self.containers.get(id).is_some_and(|c| c.stale);
                    self.containers.insert(
                        *id,
                        CachedContainer {
                            view: view.clone(),
                            stale,
                        },
                    );
                }
                None => {
                    self.containers.remove(id);
                }
            }
        }
    }

    /// Mark a container as needing a refetch.
    pub fn invalidate(&mut self, container: ContainerId) {
        if let Some(cached) = self.containers.get_mut(&container) {
            cached.stale = true;
        }
    }

    #[must_use]
    pub fn is_stale(&self, container: ContainerId) -> bool {
        self.containers.get(&container).is_some_and(|c| c.stale)
    }

    /// Containers awaiting a refetch, in id order.
    #[must_use]
    pub fn stale_containers(&self) -> Vec<ContainerId> {
        let mut stale: Vec<ContainerId> = self
            .containers
            .iter()
            .filter(|(_, c)| c.stale)
            .map(|(id, _)| *id)
            .collect();
        stale.sort_unstable();
        stale
    }

    /// Forget a container entirely.
    pub fn evict(&mut self, container: ContainerId) {
        self.containers.remove(&container);
    }
}
