#![forbid(unsafe_code)]

//! Error taxonomy for reordering.
//!
//! Nothing here is fatal: every failure resolves to either a revert of the
//! optimistic cache or a refetch of the affected containers.

use menusort_core::{ContainerId, EntityId};
use thiserror::Error;

/// Failure reported by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(EntityId),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failure of a reorder, surfaced to the caller with a reconciliation directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// Released outside every registered container.
    #[error("drop target is not a registered container")]
    InvalidDropTarget,
    /// The drop reproduces the current order.
    #[error("drop does not change the order")]
    NoOpDrop,
    /// A renumbering pass was required and its batch failed.
    #[error("renumbering {container} failed")]
    AllocationCollision {
        container: ContainerId,
        #[source]
        source: StoreError,
    },
    /// A position/parent update was rejected or never arrived.
    #[error("updating {entity} failed")]
    MutationFailure {
        entity: EntityId,
        #[source]
        source: StoreError,
    },
    /// Exactly one half of a swap failed.
    #[error("swap left {failed} unchanged while its partner moved")]
    PartialSwapFailure {
        failed: EntityId,
        #[source]
        source: StoreError,
    },
    #[error("{0} is not in the cache")]
    UnknownEntity(EntityId),
    #[error("{0} has not been loaded")]
    ContainerNotLoaded(ContainerId),
    /// Every issued request was answered yet the dispatch did not settle.
    #[error("dispatch stalled")]
    Stalled,
}

impl ReorderError {
    /// Whether the user should be told (toast/banner). No-op and invalid
    /// drops are silent.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::InvalidDropTarget | Self::NoOpDrop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn source_chain_reaches_store_error() {
        let err = ReorderError::MutationFailure {
            entity: EntityId(4),
            source: StoreError::Transport("connection reset".into()),
        };
        assert_eq!(err.to_string(), "updating entity#4 failed");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("transport failure: connection reset"));
    }

    #[test]
    fn silent_errors() {
        assert!(!ReorderError::NoOpDrop.is_user_visible());
        assert!(!ReorderError::InvalidDropTarget.is_user_visible());
        assert!(ReorderError::Stalled.is_user_visible());
    }
}
