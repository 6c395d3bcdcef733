#![forbid(unsafe_code)]

//! Keyboard reordering.
//!
//! Move-up / move-down shortcuts produce the same [`DropIntent`] a pointer
//! drop would, so both paths share the dispatcher.

use menusort_core::{EntityId, OrderedView};
use serde::{Deserialize, Serialize};

use crate::hit_test::DropKind;
use crate::session::DropIntent;

/// Direction of a keyboard move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeDirection {
    Up,
    Down,
    First,
    Last,
}

/// Intent moving `entity` one step (or to an end) within its container.
///
/// Returns `None` if the entity is not in `view` or is already at the
/// boundary in that direction.
#[must_use]
pub fn nudge(view: &OrderedView, entity: EntityId, direction: NudgeDirection) -> Option<DropIntent> {
    let current = view.index_of(entity)?;
    let container = view.get(entity)?.parent_id;
    let last = view.len() - 1;

    // Slots index the siblings excluding `entity`, which has `last` entries.
    let index = match direction {
        NudgeDirection::Up | NudgeDirection::First if current == 0 => return None,
        NudgeDirection::Down | NudgeDirection::Last if current == last => return None,
        NudgeDirection::Up => current - 1,
        NudgeDirection::Down => current + 1,
        NudgeDirection::First => 0,
        NudgeDirection::Last => last,
    };

    Some(DropIntent {
        entity,
        source: container,
        target: container,
        index,
        kind: DropKind::Insert,
    })
}
