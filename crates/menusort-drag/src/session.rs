#![forbid(unsafe_code)]

//! Drag session state machine.
//!
//! ```text
//! Idle -> Dragging <-> Hovering -> Idle (Dropped)
//!            \------------\------> Idle (Cancelled)
//! ```
//!
//! [`DragSessionController`] consumes [`DragInput`] and reports one
//! [`DragTransition`] per input. `Dropped` and `Cancelled` are effects, not
//! resting states: the machine is back in `Idle` as soon as they are reported.
//!
//! # Invariants
//!
//! 1. At most one session is active per [`SessionGate`]; a pointer-down while
//!    any controller sharing the gate is active is a no-op. Controllers built
//!    with [`DragSessionController::new`] share [`SessionGate::global`], so the
//!    limit is process-wide unless a host opts into a private gate.
//! 2. A gesture emits at most one [`DropIntent`], and only from a pointer-up
//!    over a registered container.
//! 3. Cancellation (Escape, blur, release outside containers) emits no intent.
//! 4. Hit testing during a session uses the geometry captured at pointer-down.

use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicBool, Ordering};

use menusort_core::{ContainerId, EntityId, Point, Rect, ReorderConfig};
use serde::{Deserialize, Serialize};

pub use crate::hit_test::{DropKind, DropTarget};
use crate::hit_test::{HitTestOptions, resolve_drop_target};
use crate::region::RegionTable;

// ---------------------------------------------------------------------------
// Re-entrancy guard
// ---------------------------------------------------------------------------

static GLOBAL_GATE: LazyLock<SessionGate> = LazyLock::new(SessionGate::new);

/// Shared flag allowing a single active drag session among all controllers
/// holding a clone of the gate.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    active: Arc<AtomicBool>,
}

impl SessionGate {
    /// A fresh gate, independent of every other.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide gate used by default-constructed controllers.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_GATE.clone()
    }

    /// Whether both handles guard the same session slot.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.active, &other.active)
    }

    /// Claim the gate. Returns `None` if another session holds it.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SessionPermit> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionPermit {
                active: Arc::clone(&self.active),
            })
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Proof of holding a [`SessionGate`]; releases it on drop.
#[derive(Debug)]
pub struct SessionPermit {
    active: Arc<AtomicBool>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Input and output types
// ---------------------------------------------------------------------------

/// Input consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragInput {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    Cancel(CancelReason),
}

/// Why a session ended without an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Escape,
    Blur,
    /// Released outside every registered container.
    InvalidDropTarget,
    Programmatic,
}

/// Finalized result of a drag gesture, handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropIntent {
    pub entity: EntityId,
    pub source: ContainerId,
    pub target: ContainerId,
    /// Insertion slot among the target's entities excluding `entity`.
    pub index: usize,
    pub kind: DropKind,
}

impl DropIntent {
    #[must_use]
    pub fn is_cross_container(&self) -> bool {
        self.source != self.target
    }
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    Idle,
    /// An entity is held but the pointer is not over any container.
    Dragging {
        entity: EntityId,
        source: ContainerId,
        current: Point,
    },
    Hovering {
        entity: EntityId,
        source: ContainerId,
        current: Point,
        target: DropTarget,
    },
}

impl DragState {
    #[must_use]
    pub const fn active_entity(&self) -> Option<EntityId> {
        match self {
            Self::Idle => None,
            Self::Dragging { entity, .. } | Self::Hovering { entity, .. } => Some(*entity),
        }
    }
}

/// Explicit no-op diagnostics for inputs that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    NoEntityUnderPointer,
    ActiveDragAlreadyInProgress,
    SessionHeldElsewhere,
    HoverUnchanged,
}

/// Effect emitted by one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Started {
        entity: EntityId,
        source: ContainerId,
        origin: Point,
    },
    /// The hovered target changed; `None` means the pointer left every container.
    HoverChanged { target: Option<DropTarget> },
    Dropped(DropIntent),
    Cancelled {
        entity: EntityId,
        reason: CancelReason,
    },
    Noop { reason: DragNoopReason },
}

/// One state-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

impl DragTransition {
    /// The drop intent, if this transition finalized one.
    #[must_use]
    pub const fn intent(&self) -> Option<DropIntent> {
        match self.effect {
            DragEffect::Dropped(intent) => Some(intent),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Pointer-driven drag session controller.
#[derive(Debug)]
pub struct DragSessionController {
    state: DragState,
    options: HitTestOptions,
    gate: SessionGate,
    permit: Option<SessionPermit>,
    /// Region geometry captured at pointer-down.
    snapshot: RegionTable,
    placeholder: Option<Rect>,
    transition_counter: u64,
}

impl Default for DragSessionController {
    fn default() -> Self {
        Self::new(&ReorderConfig::default())
    }
}

impl DragSessionController {
    /// Controller on the process-wide gate.
    #[must_use]
    pub fn new(config: &ReorderConfig) -> Self {
        Self::with_gate(config, SessionGate::global())
    }

    /// Controller with a private gate of its own (tests, isolated hosts).
    #[must_use]
    pub fn isolated(config: &ReorderConfig) -> Self {
        Self::with_gate(config, SessionGate::new())
    }

    /// Controller sharing `gate` with other controllers.
    #[must_use]
    pub fn with_gate(config: &ReorderConfig, gate: SessionGate) -> Self {
        Self {
            state: DragState::Idle,
            options: HitTestOptions {
                axis: config.axis,
                swap_on_entity_hover: config.swap_on_entity_hover,
            },
            gate,
            permit: None,
            snapshot: RegionTable::new(),
            placeholder: None,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Original bounds of the dragged entity, for reserving its space while
    /// it is visually detached.
    #[must_use]
    pub const fn placeholder(&self) -> Option<Rect> {
        self.placeholder
    }

    /// Geometry captured at pointer-down.
    #[must_use]
    pub fn snapshot(&self) -> &RegionTable {
        &self.snapshot
    }

    /// Apply one input. `regions` is the live layout and is only read on
    /// pointer-down; later inputs hit-test against the captured snapshot.
    pub fn apply(&mut self, input: DragInput, regions: &RegionTable) -> DragTransition {
        let from = self.state;
        let effect = match (self.state, input) {
            (DragState::Idle, DragInput::PointerDown(p)) => self.begin(p, regions),
            (DragState::Idle, _) => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            (_, DragInput::PointerDown(_)) => DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress,
            },
            (
                DragState::Dragging { entity, source, .. }
                | DragState::Hovering { entity, source, .. },
                DragInput::PointerMove(p),
            ) => self.hover(entity, source, p),
            (
                DragState::Dragging { entity, source, .. }
                | DragState::Hovering { entity, source, .. },
                DragInput::PointerUp(p),
            ) => self.release(entity, source, p),
            (
                DragState::Dragging { entity, .. } | DragState::Hovering { entity, .. },
                DragInput::Cancel(reason),
            ) => self.end_cancelled(entity, reason),
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        };
        if !matches!(effect, DragEffect::Noop { .. }) {
            tracing::debug!(
                target: "menusort.drag",
                transition_id = transition.transition_id,
                effect = ?transition.effect,
                "drag transition"
            );
        }
        transition
    }

    /// Unconditionally return to `Idle`, reporting a programmatic cancel if a
    /// session was active. Returns `None` when already idle.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        let entity = self.state.active_entity()?;
        let from = self.state;
        let effect = self.end_cancelled(entity, CancelReason::Programmatic);
        self.transition_counter = self.transition_counter.saturating_add(1);
        Some(DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        })
    }

    /// Drop all session state without reporting anything.
    pub fn reset(&mut self) {
        self.finish();
    }

    fn begin(&mut self, p: Point, regions: &RegionTable) -> DragEffect {
        let Some(region) = regions.entity_at(p).copied() else {
            return DragEffect::Noop {
                reason: DragNoopReason::NoEntityUnderPointer,
            };
        };
        let Some(permit) = self.gate.try_acquire() else {
            return DragEffect::Noop {
                reason: DragNoopReason::SessionHeldElsewhere,
            };
        };

        self.permit = Some(permit);
        self.snapshot.clone_from(regions);
        self.placeholder = Some(region.bounds);

        // The pointer starts on the entity itself, which maps back to its
        // current slot.
        self.state = match self.resolve(region.id, region.container, p) {
            Some(target) => DragState::Hovering {
                entity: region.id,
                source: region.container,
                current: p,
                target,
            },
            None => DragState::Dragging {
                entity: region.id,
                source: region.container,
                current: p,
            },
        };
        DragEffect::Started {
            entity: region.id,
            source: region.container,
            origin: p,
        }
    }

    fn hover(&mut self, entity: EntityId, source: ContainerId, p: Point) -> DragEffect {
        let previous = match self.state {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        };
        let target = self.resolve(entity, source, p);
        self.state = match target {
            Some(target) => DragState::Hovering {
                entity,
                source,
                current: p,
                target,
            },
            None => DragState::Dragging {
                entity,
                source,
                current: p,
            },
        };
        if target == previous {
            DragEffect::Noop {
                reason: DragNoopReason::HoverUnchanged,
            }
        } else {
            DragEffect::HoverChanged { target }
        }
    }

    fn release(&mut self, entity: EntityId, source: ContainerId, p: Point) -> DragEffect {
        let Some(target) = self.resolve(entity, source, p) else {
            return self.end_cancelled(entity, CancelReason::InvalidDropTarget);
        };
        self.finish();
        DragEffect::Dropped(DropIntent {
            entity,
            source,
            target: target.container,
            index: target.index,
            kind: target.kind,
        })
    }

    fn end_cancelled(&mut self, entity: EntityId, reason: CancelReason) -> DragEffect {
        self.finish();
        DragEffect::Cancelled { entity, reason }
    }

    fn finish(&mut self) {
        self.state = DragState::Idle;
        self.permit = None;
        self.snapshot.clear();
        self.placeholder = None;
    }

    fn resolve(&self, entity: EntityId, source: ContainerId, p: Point) -> Option<DropTarget> {
        resolve_drop_target(&self.snapshot, entity, source, p, self.options)
    }
}
