#![forbid(unsafe_code)]

//! Pointer geometry → drop target.
//!
//! Pure functions over a [`RegionTable`]; cost is linear in the number of
//! siblings of the hovered container and nothing here allocates.

use menusort_core::{Axis, ContainerId, EntityId, Point};
use serde::{Deserialize, Serialize};

use crate::region::RegionTable;

/// How a drop should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropKind {
    /// Insert at the target slot, shifting nothing else.
    Insert,
    /// Trade positions with another entity of the same container.
    Swap { with: EntityId },
}

/// Container and insertion slot under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropTarget {
    pub container: ContainerId,
    /// Slot among the container's entities excluding the active one.
    pub index: usize,
    pub kind: DropKind,
}

/// Options consulted while resolving a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestOptions {
    pub axis: Axis,
    pub swap_on_entity_hover: bool,
}

/// Resolve the drop target for `active` (dragged out of `source`) at `p`.
///
/// Returns `None` when `p` is outside every registered container.
///
/// Within the target container the midpoint rule applies: the slot is the
/// index of the first sibling whose midpoint lies after `p`, or the sibling
/// count if `p` is past all of them. In the source container, landing
/// directly on another entity is a swap when enabled.
#[must_use]
pub fn resolve_drop_target(
    regions: &RegionTable,
    active: EntityId,
    source: ContainerId,
    p: Point,
    options: HitTestOptions,
) -> Option<DropTarget> {
    let container = regions.container_at(p)?;

    // Number of siblings displayed before the active entity; only meaningful
    // in the source container.
    let mut active_index = None;
    let mut midpoint_index = None;
    let mut over = None;
    let mut count = 0usize;

    for region in regions.entities_in(container) {
        if region.id == active {
            active_index = Some(count);
            continue;
        }
        if midpoint_index.is_none() && region.bounds.is_before_midpoint(p, options.axis) {
            midpoint_index = Some(count);
        }
        if over.is_none() && region.bounds.contains(p) {
            over = Some((count, region.id));
        }
        count += 1;
    }

    if options.swap_on_entity_hover
        && container == source
        && let Some((over_index, with)) = over
    {
        // The active entity takes the hovered entity's display slot.
        let index = match active_index {
            Some(a) if over_index >= a => over_index + 1,
            _ => over_index,
        };
        return Some(DropTarget {
            container,
            index,
            kind: DropKind::Swap { with },
        });
    }

    Some(DropTarget {
        container,
        index: midpoint_index.unwrap_or(count),
        kind: DropKind::Insert,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusort_core::Rect;

    const INSERT_ONLY: HitTestOptions = HitTestOptions {
        axis: Axis::Vertical,
        swap_on_entity_hover: false,
    };
    const WITH_SWAP: HitTestOptions = HitTestOptions {
        axis: Axis::Vertical,
        swap_on_entity_hover: true,
    };

    /// Container 1 at y 0..100 with entities 1,2,3 stacked 20 tall from y=0
    /// (gaps of 5 between them); container 2 at y 200..300, empty.
    fn table() -> RegionTable {
        let mut t = RegionTable::new();
        t.register_container(ContainerId(1), Rect::new(0, 0, 100, 100));
        t.register_container(ContainerId(2), Rect::new(0, 200, 100, 100));
        for (i, id) in [1u64, 2, 3].into_iter().enumerate() {
            t.register_entity(
                EntityId(id),
                ContainerId(1),
                Rect::new(0, i as i32 * 25, 100, 20),
            );
        }
        t
    }

    fn at(y: i32) -> Point {
        Point::new(50, y)
    }

    #[test]
    fn outside_containers_is_none() {
        let t = table();
        assert_eq!(
            resolve_drop_target(&t, EntityId(1), ContainerId(1), at(150), INSERT_ONLY),
            None
        );
    }

    #[test]
    fn midpoint_rule_excludes_active() {
        let t = table();
        // Dragging entity 3; siblings 1 (mid 10) and 2 (mid 35).
        let slot = |y| {
            resolve_drop_target(&t, EntityId(3), ContainerId(1), at(y), INSERT_ONLY)
                .map(|d| d.index)
        };
        assert_eq!(slot(5), Some(0));
        assert_eq!(slot(12), Some(1));
        assert_eq!(slot(40), Some(2));
        assert_eq!(slot(90), Some(2));
    }

    #[test]
    fn own_region_maps_back_to_current_index() {
        let t = table();
        // Entity 2 occupies y 25..45 and sits at index 1.
        for y in 25..45 {
            let target =
                resolve_drop_target(&t, EntityId(2), ContainerId(1), at(y), WITH_SWAP).unwrap();
            assert_eq!(target.index, 1, "y={y}");
            assert_eq!(target.kind, DropKind::Insert);
        }
    }

    #[test]
    fn hovering_sibling_in_source_container_is_swap() {
        let t = table();
        let down = resolve_drop_target(&t, EntityId(1), ContainerId(1), at(55), WITH_SWAP).unwrap();
        assert_eq!(
            down.kind,
            DropKind::Swap {
                with: EntityId(3)
            }
        );
        // Entity 3 is at excluded index 1, after the active entity.
        assert_eq!(down.index, 2);

        let up = resolve_drop_target(&t, EntityId(3), ContainerId(1), at(3), WITH_SWAP).unwrap();
        assert_eq!(
            up.kind,
            DropKind::Swap {
                with: EntityId(1)
            }
        );
        assert_eq!(up.index, 0);
    }

    #[test]
    fn gap_between_entities_is_insertion() {
        let t = table();
        let target =
            resolve_drop_target(&t, EntityId(1), ContainerId(1), at(47), WITH_SWAP).unwrap();
        assert_eq!(target.kind, DropKind::Insert);
        assert_eq!(target.index, 1);
    }

    #[test]
    fn other_container_never_swaps() {
        let mut t = table();
        t.register_entity(EntityId(9), ContainerId(2), Rect::new(0, 200, 100, 20));
        let target =
            resolve_drop_target(&t, EntityId(1), ContainerId(1), at(205), WITH_SWAP).unwrap();
        assert_eq!(target.container, ContainerId(2));
        assert_eq!(target.kind, DropKind::Insert);
        assert_eq!(target.index, 0);
    }

    #[test]
    fn empty_container_slot_zero() {
        let t = table();
        let target =
            resolve_drop_target(&t, EntityId(1), ContainerId(1), at(250), WITH_SWAP).unwrap();
        assert_eq!(target.container, ContainerId(2));
        assert_eq!(target.index, 0);
    }

    #[test]
    fn horizontal_axis_uses_x() {
        let mut t = RegionTable::new();
        t.register_container(ContainerId(1), Rect::new(0, 0, 300, 20));
        t.register_entity(EntityId(1), ContainerId(1), Rect::new(0, 0, 100, 20));
        t.register_entity(EntityId(2), ContainerId(1), Rect::new(100, 0, 100, 20));
        t.register_entity(EntityId(3), ContainerId(1), Rect::new(200, 0, 100, 20));
        let options = HitTestOptions {
            axis: Axis::Horizontal,
            swap_on_entity_hover: false,
        };
        let target =
            resolve_drop_target(&t, EntityId(3), ContainerId(1), Point::new(120, 5), options)
                .unwrap();
        assert_eq!(target.index, 1);
    }
}
