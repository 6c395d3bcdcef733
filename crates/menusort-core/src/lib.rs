#![forbid(unsafe_code)]

//! Core: entity model, geometry, position allocation, and ordered views.
//!
//! # Role in menusort
//! `menusort-core` is the pure layer. It owns the ordering contract shared by
//! menu categories and menu items, and the arithmetic that keeps the durable
//! integer `position` field consistent with the display order.
//!
//! # Primary responsibilities
//! - **OrderedEntity**: an orderable entity with a parent container and a position.
//! - **Allocator**: computes a new position for an insertion slot, detects
//!   no-op moves, and renumbers a container when integer headroom runs out.
//! - **OrderedView**: derives the display order (`position` asc, `id` asc).
//! - **ReorderConfig**: tunables, optionally loaded from TOML/JSON.
//!
//! # How it fits in the system
//! The drag controller (`menusort-drag`) turns pointer geometry into drop
//! intents; the dispatcher (`menusort-sync`) turns intents into mutations by
//! consulting [`view::OrderedView`] and [`allocator`]. Nothing in this crate
//! performs I/O.

pub mod allocator;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod view;

pub use allocator::{Allocation, CurrentSlot};
pub use config::ReorderConfig;
pub use entity::{ContainerId, EntityId, EntityKind, EntityPatch, OrderedEntity};
pub use geometry::{Axis, Point, Rect};
pub use view::OrderedView;
