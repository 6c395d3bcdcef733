#![forbid(unsafe_code)]

//! Drag-to-reorder input handling.
//!
//! # Role in menusort
//! `menusort-drag` turns pointer and key input into a single [`DropIntent`]
//! per gesture. It never touches persistence: the intent is handed to the
//! dispatcher in `menusort-sync`.
//!
//! # Primary responsibilities
//! - **RegionTable**: bounding regions registered by the UI layer each
//!   layout pass, decoupling hit testing from the rendering technology.
//! - **DragSessionController**: `Idle → Dragging → Hovering → Idle`, with a
//!   process-wide re-entrancy guard ([`SessionGate`]).
//! - **Keyboard nudges**: move-up/move-down shortcuts producing the same intent.

pub mod hit_test;
pub mod keyboard;
pub mod region;
pub mod session;

pub use hit_test::{HitTestOptions, resolve_drop_target};
pub use keyboard::{NudgeDirection, nudge};
pub use region::{ContainerRegion, EntityRegion, RegionTable};
pub use session::{
    CancelReason, DragEffect, DragInput, DragNoopReason, DragSessionController, DragState,
    DragTransition, DropIntent, DropKind, DropTarget, SessionGate, SessionPermit,
};
