#![forbid(unsafe_code)]

//! Orderable entities and the partial-update patch applied to them.
//!
//! Categories (parent = menu) and items (parent = category) share one
//! ordering contract, so the engine only ever sees [`OrderedEntity`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an orderable entity (a category or an item).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

/// Identifier of a container that scopes one sibling ordering.
///
/// A menu is the container of categories; a category is the container of
/// items, hence the `From<EntityId>` conversion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

impl From<EntityId> for ContainerId {
    fn from(id: EntityId) -> Self {
        Self(id.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// Which level of the menu hierarchy an entity lives on.
///
/// Only used to label logs; the ordering rules are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Item,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Item => "item",
        }
    }
}

/// An entity ordered among the siblings sharing its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedEntity {
    pub id: EntityId,
    pub parent_id: ContainerId,
    pub position: i64,
}

impl OrderedEntity {
    #[must_use]
    pub const fn new(id: EntityId, parent_id: ContainerId, position: i64) -> Self {
        Self {
            id,
            parent_id,
            position,
        }
    }

    /// Sort key establishing display order within a container.
    #[inline]
    #[must_use]
    pub const fn order_key(&self) -> (i64, EntityId) {
        (self.position, self.id)
    }
}

/// Partial field update keyed by entity id.
///
/// Absent fields are left untouched and are omitted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ContainerId>,
}

impl EntityPatch {
    /// Patch that only moves the entity within its current container.
    #[must_use]
    pub const fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            parent_id: None,
        }
    }

    /// Patch that reassigns the container and position together.
    #[must_use]
    pub const fn relocate(parent_id: ContainerId, position: i64) -> Self {
        Self {
            position: Some(position),
            parent_id: Some(parent_id),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position.is_none() && self.parent_id.is_none()
    }

    /// Apply the patch to an entity, returning the updated copy.
    #[must_use]
    pub fn apply(&self, entity: OrderedEntity) -> OrderedEntity {
        OrderedEntity {
            id: entity.id,
            parent_id: self.parent_id.unwrap_or(entity.parent_id),
            position: self.position.unwrap_or(entity.position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_serializes_only_present_fields() {
        let json = serde_json::to_string(&EntityPatch::position(42)).unwrap();
        assert_eq!(json, r#"{"position":42}"#);

        let json = serde_json::to_string(&EntityPatch::relocate(ContainerId(7), -3)).unwrap();
        assert_eq!(json, r#"{"position":-3,"parentId":7}"#);

        let empty: EntityPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn patch_apply_keeps_id_and_unset_fields() {
        let e = OrderedEntity::new(EntityId(1), ContainerId(2), 10);
        assert_eq!(EntityPatch::position(5).apply(e).parent_id, ContainerId(2));
        let moved = EntityPatch::relocate(ContainerId(9), 0).apply(e);
        assert_eq!(moved, OrderedEntity::new(EntityId(1), ContainerId(9), 0));
        assert_eq!(EntityPatch::default().apply(e), e);
    }

    #[test]
    fn entity_wire_format_is_camel_case() {
        let e = OrderedEntity::new(EntityId(3), ContainerId(4), 100);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"id":3,"parentId":4,"position":100}"#);
    }

    #[test]
    fn order_key_breaks_ties_by_id() {
        let a = OrderedEntity::new(EntityId(2), ContainerId(1), 5);
        let b = OrderedEntity::new(EntityId(1), ContainerId(1), 5);
        assert!(b.order_key() < a.order_key());
    }
}
