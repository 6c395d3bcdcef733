#![forbid(unsafe_code)]

//! Position allocation for ordered siblings.
//!
//! Positions are sparse integers. Inserting between two siblings takes the
//! floor midpoint of their positions, so most moves rewrite a single entity.
//! When two neighbors are adjacent integers no value fits between them and
//! the container must be renumbered with a fixed stride before retrying.
//!
//! # Invariants
//!
//! 1. An [`Allocation::At`] value never equals a sibling position and always
//!    lies strictly between the neighbors of the insertion slot.
//! 2. [`renumber`] preserves the relative order of its input.
//! 3. No arithmetic here overflows; exhausted headroom at the extremes of
//!    `i64` is reported as [`Allocation::Exhausted`].

use crate::entity::EntityId;

/// Position given to the first entity of an empty container.
pub const DEFAULT_BASELINE: i64 = 0;

/// Spacing between consecutive positions after a renumbering pass.
pub const DEFAULT_RENUMBER_STRIDE: i64 = 1000;

/// Outcome of a position allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The drop reproduces the current order; no mutation is needed.
    Unchanged,
    /// The entity should take this position.
    At(i64),
    /// No integer fits in the slot; renumber the container and retry.
    Exhausted,
}

impl Allocation {
    #[must_use]
    pub const fn position(self) -> Option<i64> {
        match self {
            Self::At(p) => Some(p),
            Self::Unchanged | Self::Exhausted => None,
        }
    }
}

/// Where the moving entity currently sits in the container it is moving within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSlot {
    /// Index among the siblings excluding the entity itself; equivalently the
    /// entity's own index in the full display order.
    pub index: usize,
    pub position: i64,
}

/// Compute a position for an insertion at `index` among `siblings`.
///
/// `siblings` are the positions of the other entities of the container in
/// display order, excluding the moving entity.
#[must_use]
pub fn allocate(siblings: &[i64], index: usize, baseline: i64) -> Allocation {
    let Some((&first, _)) = siblings.split_first() else {
        return Allocation::At(baseline);
    };

    if index == 0 {
        return first.checked_sub(1).map_or(Allocation::Exhausted, Allocation::At);
    }

    if index >= siblings.len() {
        let last = siblings[siblings.len() - 1];
        return last.checked_add(1).map_or(Allocation::Exhausted, Allocation::At);
    }

    let before = siblings[index - 1];
    let after = siblings[index];
    let candidate = floor_midpoint(before, after);
    if candidate != before && candidate != after {
        return Allocation::At(candidate);
    }

    match before.checked_add(1) {
        Some(fallback) if fallback < after => Allocation::At(fallback),
        _ => Allocation::Exhausted,
    }
}

/// Like [`allocate`], but reports [`Allocation::Unchanged`] when the move
/// would leave the entity where it already is.
///
/// Pass `current = None` when the entity comes from another container.
#[must_use]
pub fn allocate_move(
    siblings: &[i64],
    index: usize,
    current: Option<CurrentSlot>,
    baseline: i64,
) -> Allocation {
    let index = index.min(siblings.len());
    if let Some(slot) = current
        && slot.index == index
    {
        return Allocation::Unchanged;
    }

    match allocate(siblings, index, baseline) {
        Allocation::At(p) if current.is_some_and(|slot| slot.position == p) => {
            Allocation::Unchanged
        }
        other => other,
    }
}

/// Assign fresh, evenly spaced positions to `ids` in the given order.
///
/// The first id gets `baseline`; each subsequent id is `stride` further.
#[must_use]
pub fn renumber<I>(ids: I, stride: i64, baseline: i64) -> Vec<(EntityId, i64)>
where
    I: IntoIterator<Item = EntityId>,
{
    let stride = stride.max(1);
    let mut next = baseline;
    ids.into_iter()
        .map(|id| {
            let assigned = next;
            next = next.saturating_add(stride);
            (id, assigned)
        })
        .collect()
}

/// Position for a newly created entity appended at the end of a container.
#[must_use]
pub fn append_position<I>(siblings: I, baseline: i64) -> i64
where
    I: IntoIterator<Item = i64>,
{
    siblings
        .into_iter()
        .max()
        .map_or(baseline, |max| max.saturating_add(1))
}

fn floor_midpoint(a: i64, b: i64) -> i64 {
    let sum = i128::from(a) + i128::from(b);
    // Fits: the mean of two i64 values is an i64.
    sum.div_euclid(2) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_container_uses_baseline() {
        assert_eq!(allocate(&[], 0, 0), Allocation::At(0));
        assert_eq!(allocate(&[], 5, 7), Allocation::At(7));
    }

    #[test]
    fn head_and_tail() {
        let siblings = [0, 10, 20];
        assert_eq!(allocate(&siblings, 0, 0), Allocation::At(-1));
        assert_eq!(allocate(&siblings, 3, 0), Allocation::At(21));
        assert_eq!(allocate(&siblings, 99, 0), Allocation::At(21));
    }

    #[test]
    fn midpoint_between_neighbors() {
        assert_eq!(allocate(&[0, 10], 1, 0), Allocation::At(5));
        assert_eq!(allocate(&[0, 3], 1, 0), Allocation::At(1));
    }

    #[test]
    fn midpoint_floors_negative_sums() {
        // (-3 + 0) / 2 = -1.5, floor is -2.
        assert_eq!(allocate(&[-3, 0], 1, 0), Allocation::At(-2));
    }

    #[test]
    fn adjacent_neighbors_are_exhausted() {
        assert_eq!(allocate(&[5, 6], 1, 0), Allocation::Exhausted);
        assert_eq!(allocate(&[5, 5], 1, 0), Allocation::Exhausted);
    }

    #[test]
    fn extremes_are_exhausted_not_overflowing() {
        assert_eq!(allocate(&[i64::MIN], 0, 0), Allocation::Exhausted);
        assert_eq!(allocate(&[i64::MAX], 1, 0), Allocation::Exhausted);
        assert_eq!(
            allocate(&[i64::MAX - 2, i64::MAX], 1, 0),
            Allocation::At(i64::MAX - 1)
        );
    }

    #[test]
    fn move_to_current_index_is_unchanged() {
        // Full order [1, 2, 3]; entity at index 1 (position 2) excluded.
        let current = Some(CurrentSlot {
            index: 1,
            position: 2,
        });
        assert_eq!(allocate_move(&[1, 3], 1, current, 0), Allocation::Unchanged);
        assert_eq!(allocate_move(&[1, 3], 0, current, 0), Allocation::At(0));
    }

    #[test]
    fn move_yielding_current_position_is_unchanged() {
        let current = Some(CurrentSlot {
            index: 2,
            position: 5,
        });
        // Stale index, but the slot resolves to the current position.
        assert_eq!(allocate_move(&[0, 10], 1, current, 0), Allocation::Unchanged);
    }

    #[test]
    fn cross_container_move_never_unchanged() {
        assert_eq!(allocate_move(&[], 0, None, 0), Allocation::At(0));
        assert_eq!(allocate_move(&[4], 0, None, 0), Allocation::At(3));
    }

    #[test]
    fn renumber_spaces_by_stride() {
        let out = renumber([EntityId(3), EntityId(1), EntityId(2)], 100, 0);
        assert_eq!(
            out,
            vec![(EntityId(3), 0), (EntityId(1), 100), (EntityId(2), 200)]
        );
    }

    #[test]
    fn renumber_clamps_nonpositive_stride() {
        let out = renumber([EntityId(1), EntityId(2)], 0, 10);
        assert_eq!(out, vec![(EntityId(1), 10), (EntityId(2), 11)]);
    }

    #[test]
    fn append_after_max() {
        assert_eq!(append_position([], 0), 0);
        assert_eq!(append_position([4, 9, 2], 0), 10);
        assert_eq!(append_position([i64::MAX], 0), i64::MAX);
    }
}
