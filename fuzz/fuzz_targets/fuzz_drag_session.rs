#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use menusort_core::{ContainerId, EntityId, Point, Rect, ReorderConfig};
use menusort_drag::{CancelReason, DragEffect, DragInput, DragSessionController, RegionTable};

#[derive(Debug, Arbitrary)]
enum Op {
    Down(i16, i16),
    Move(i16, i16),
    Up(i16, i16),
    Cancel(u8),
    ForceCancel,
    Relayout(u8),
}

fn layout(shift: u8) -> RegionTable {
    let shift = i32::from(shift % 32);
    let mut t = RegionTable::new();
    t.register_container(ContainerId(1), Rect::new(0, shift, 200, 100));
    t.register_container(ContainerId(2), Rect::new(0, 150 + shift, 200, 100));
    for i in 0..4u64 {
        let container = ContainerId(1 + i / 2);
        let top = if i < 2 { shift } else { 150 + shift };
        t.register_entity(EntityId(i + 1), container, Rect::new(0, top + (i % 2) as i32 * 25, 200, 20));
    }
    t
}

fuzz_target!(|ops: Vec<Op>| {
    let mut regions = layout(0);
    let mut c = DragSessionController::isolated(&ReorderConfig::default());
    let mut intents_this_gesture = 0u32;

    for op in ops.into_iter().take(256) {
        let input = match op {
            Op::Down(x, y) => DragInput::PointerDown(Point::new(x.into(), y.into())),
            Op::Move(x, y) => DragInput::PointerMove(Point::new(x.into(), y.into())),
            Op::Up(x, y) => DragInput::PointerUp(Point::new(x.into(), y.into())),
            Op::Cancel(r) => DragInput::Cancel(if r % 2 == 0 {
                CancelReason::Escape
            } else {
                CancelReason::Blur
            }),
            Op::ForceCancel => {
                c.force_cancel();
                assert!(!c.gate().is_held());
                continue;
            }
            Op::Relayout(shift) => {
                regions = layout(shift);
                continue;
            }
        };

        let transition = c.apply(input, &regions);
        match transition.effect {
            DragEffect::Started { .. } => intents_this_gesture = 0,
            DragEffect::Dropped(intent) => {
                intents_this_gesture += 1;
                assert_eq!(intents_this_gesture, 1, "gesture emitted two intents");
                assert!(regions.container_bounds(intent.target).is_some());
            }
            _ => {}
        }
        // The gate is held exactly while a session is active.
        assert_eq!(c.is_active(), c.gate().is_held());
    }
});
