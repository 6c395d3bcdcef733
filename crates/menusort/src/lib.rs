#![forbid(unsafe_code)]

//! menusort public facade crate.
//!
//! Re-exports the common types of the internal crates and wires one drag
//! controller to one mutation dispatcher in [`MenuReorderer`].

use std::fmt;

pub use menusort_core::allocator::{DEFAULT_BASELINE, DEFAULT_RENUMBER_STRIDE};
pub use menusort_core::{
    Allocation, Axis, ContainerId, CurrentSlot, EntityId, EntityKind, EntityPatch,
    OrderedEntity, OrderedView, Point, Rect, ReorderConfig,
};
#[cfg(feature = "config")]
pub use menusort_core::config::ConfigError;
pub use menusort_drag::{
    CancelReason, DragEffect, DragInput, DragNoopReason, DragSessionController, DragState,
    DragTransition, DropIntent, DropKind, DropTarget, NudgeDirection, RegionTable, SessionGate,
};
pub use menusort_sync::{
    DispatchStep, DispatchTicket, EntityStore, MemoryStore, MutationDispatcher, MutationRequest,
    MutationResponse, Reconcile, ReorderError, Settlement, StoreError, execute,
    execute_concurrent,
};

mod reorderer;

pub use reorderer::MenuReorderer;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for menusort hosts.
#[derive(Debug)]
pub enum Error {
    /// The persistence layer failed outside a dispatch (load, refresh, create).
    Store(StoreError),
    /// A reorder failed; see [`Reconcile`] on the settlement for recovery.
    Reorder(ReorderError),
    /// Configuration values are out of range.
    InvalidConfig(Vec<String>),
    /// Configuration could not be read or parsed.
    #[cfg(feature = "config")]
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Reorder(err) => write!(f, "{err}"),
            Self::InvalidConfig(problems) => {
                write!(f, "invalid reorder config: {}", problems.join("; "))
            }
            #[cfg(feature = "config")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Reorder(err) => Some(err),
            Self::InvalidConfig(_) => None,
            #[cfg(feature = "config")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ReorderError> for Error {
    fn from(err: ReorderError) -> Self {
        Self::Reorder(err)
    }
}

#[cfg(feature = "config")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for menusort APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ContainerId, DispatchStep, DragInput, DropIntent, EntityId, EntityStore, Error,
        MenuReorderer, OrderedEntity, Point, Rect, Reconcile, ReorderConfig, Result, Settlement,
    };

    pub use crate::{core, drag, sync};
}

pub use menusort_core as core;
pub use menusort_drag as drag;
pub use menusort_sync as sync;
