#![forbid(unsafe_code)]

//! Persistence side of drag-to-reorder.
//!
//! # Role in menusort
//! `menusort-sync` receives a [`DropIntent`](menusort_drag::DropIntent),
//! plans the position mutations it implies, applies them optimistically to an
//! [`OrderedCache`], and reconciles with the store's responses.
//!
//! # Primary responsibilities
//! - **EntityStore**: the narrow contract consumed from the CRUD layer
//!   (`list_siblings`, `update_entity`, `create_entity`).
//! - **MutationDispatcher**: Elm-style planner; `dispatch` returns the
//!   requests to issue and `complete` folds responses back in.
//! - **OrderedCache**: per-container display order with snapshot/restore.
//! - **Executors**: run a batch of requests against a store, sequentially
//!   or concurrently.
//!
//! Nothing here blocks the UI loop unless the host chooses the blocking
//! [`MutationDispatcher::run`] driver.

pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod memory;
pub mod store;

pub use cache::{CacheSnapshot, OrderedCache};
pub use dispatcher::{
    DispatchStep, DispatchTicket, MutationDispatcher, MutationRequest, MutationResponse,
    Reconcile, RequestId, Settlement,
};
pub use error::{ReorderError, StoreError};
pub use executor::{execute, execute_concurrent};
pub use memory::MemoryStore;
pub use store::EntityStore;
