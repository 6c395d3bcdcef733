#![forbid(unsafe_code)]

//! Registered bounding regions for hit testing.
//!
//! The UI layer clears and repopulates the table on each layout pass:
//! containers first, then each container's entities in display order.

use ahash::AHashMap;
use menusort_core::{ContainerId, EntityId, Point, Rect};

/// Bounds of a drop container (a menu's category strip, a category's item list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRegion {
    pub id: ContainerId,
    pub bounds: Rect,
}

/// Bounds of one draggable entity inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRegion {
    pub id: EntityId,
    pub container: ContainerId,
    pub bounds: Rect,
}

/// Table of container and entity regions for one layout pass.
///
/// Entity regions are grouped per container, so hit testing inside one
/// container never walks the entities of another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    containers: Vec<ContainerRegion>,
    /// Entity groups in the order their container first received an entity.
    groups: Vec<(ContainerId, Vec<EntityRegion>)>,
    group_of: AHashMap<ContainerId, usize>,
    /// Entity id -> (group, slot).
    slots: AHashMap<EntityId, (usize, usize)>,
}

impl RegionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all regions before a new layout pass.
    pub fn clear(&mut self) {
        self.containers.clear();
        self.groups.clear();
        self.group_of.clear();
        self.slots.clear();
    }

    /// Register a container. Re-registering an id replaces its bounds.
    pub fn register_container(&mut self, id: ContainerId, bounds: Rect) {
        if let Some(existing) = self.containers.iter_mut().find(|c| c.id == id) {
            existing.bounds = bounds;
        } else {
            self.containers.push(ContainerRegion { id, bounds });
        }
    }

    /// Register an entity. Entities of one container must be registered in
    /// display order; re-registering an id replaces its region in place, or
    /// moves it to the end of its new container.
    pub fn register_entity(&mut self, id: EntityId, container: ContainerId, bounds: Rect) {
        let region = EntityRegion {
            id,
            container,
            bounds,
        };
        if let Some(&(group, slot)) = self.slots.get(&id) {
            if self.groups[group].0 == container {
                self.groups[group].1[slot] = region;
                return;
            }
            self.detach(group, slot);
        }

        let group = match self.group_of.get(&container).copied() {
            Some(group) => group,
            None => {
                self.groups.push((container, Vec::new()));
                self.group_of.insert(container, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let entries = &mut self.groups[group].1;
        entries.push(region);
        self.slots.insert(id, (group, entries.len() - 1));
    }

    fn detach(&mut self, group: usize, slot: usize) {
        let entries = &mut self.groups[group].1;
        entries.remove(slot);
        for (shifted, region) in entries.iter().enumerate().skip(slot) {
            self.slots.insert(region.id, (group, shifted));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.slots.is_empty()
    }

    #[must_use]
    pub fn containers(&self) -> &[ContainerRegion] {
        &self.containers
    }

    /// Container under `p`. On overlap the most recently registered wins.
    #[must_use]
    pub fn container_at(&self, p: Point) -> Option<ContainerId> {
        self.containers
            .iter()
            .rev()
            .find(|c| !c.bounds.is_empty() && c.bounds.contains(p))
            .map(|c| c.id)
    }

    /// Entity regions of `container` in display order.
    pub fn entities_in(&self, container: ContainerId) -> std::slice::Iter<'_, EntityRegion> {
        self.group_of
            .get(&container)
            .map_or(&[][..], |&group| self.groups[group].1.as_slice())
            .iter()
    }

    /// Entity under `p`, searching every container. On overlap the most
    /// recently registered wins.
    #[must_use]
    pub fn entity_at(&self, p: Point) -> Option<&EntityRegion> {
        self.groups
            .iter()
            .rev()
            .flat_map(|(_, entries)| entries.iter().rev())
            .find(|e| !e.bounds.is_empty() && e.bounds.contains(p))
    }

    #[must_use]
    pub fn region_of(&self, id: EntityId) -> Option<&EntityRegion> {
        let &(group, slot) = self.slots.get(&id)?;
        self.groups.get(group)?.1.get(slot)
    }

    #[must_use]
    pub fn container_bounds(&self, id: ContainerId) -> Option<Rect> {
        self.containers.iter().find(|c| c.id == id).map(|c| c.bounds)
    }
}
