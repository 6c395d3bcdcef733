#![forbid(unsafe_code)]

//! Contract consumed from the CRUD layer.
//!
//! Any transport conforms: REST, RPC, or direct store mutation. Only
//! partial updates keyed by entity id are required.

use menusort_core::{ContainerId, EntityId, EntityPatch, OrderedEntity};

use crate::error::StoreError;

/// Persistence operations used by the reordering engine.
pub trait EntityStore {
    /// Entities of `parent`, sorted by `position` then `id`.
    fn list_siblings(&self, parent: ContainerId) -> Result<Vec<OrderedEntity>, StoreError>;

    /// Apply a partial update and return the authoritative entity.
    fn update_entity(&self, id: EntityId, patch: EntityPatch)
    -> Result<OrderedEntity, StoreError>;

    /// Create an entity appended to the end of `parent`.
    fn create_entity(&self, parent: ContainerId) -> Result<OrderedEntity, StoreError>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    fn list_siblings(&self, parent: ContainerId) -> Result<Vec<OrderedEntity>, StoreError> {
        (**self).list_siblings(parent)
    }

    fn update_entity(
        &self,
        id: EntityId,
        patch: EntityPatch,
    ) -> Result<OrderedEntity, StoreError> {
        (**self).update_entity(id, patch)
    }

    fn create_entity(&self, parent: ContainerId) -> Result<OrderedEntity, StoreError> {
        (**self).create_entity(parent)
    }
}
