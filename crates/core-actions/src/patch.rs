//! Builds the per-side `RenderPatch`/`StatusPatch` a `process()` call
//! publishes alongside its dispatch events (§4.9).

use core_events::Side;
use core_snapshot::{ContactPosition, Diagnostics, RenderPatch, SideContacts, StatusPatch};
use core_state::CoreState;

pub fn render_patch(state: &CoreState, side: Side, frame_seq: u64) -> RenderPatch {
    let contacts = SideContacts::from_iter(
        state
            .table
            .iter_side(side)
            .map(|e| ContactPosition { id: e.contact_id, x: e.last_x, y: e.last_y }),
    );
    let highlighted_key = state.table.iter_side(side).find_map(|e| e.last_key.clone());

    RenderPatch {
        side,
        contacts,
        highlighted_key,
        layer: state.layers.active_layer(),
        frame_seq,
    }
}

pub fn status_patch(
    state: &CoreState,
    side: Side,
    contact_count: u8,
    dispatch_depth: usize,
    keyboard_mode: bool,
) -> StatusPatch {
    StatusPatch {
        side,
        intent: state.sides[side.index()].mode,
        contact_count,
        layer: state.layers.active_layer(),
        typing_enabled: state.typing_enabled,
        keyboard_mode,
        diagnostics: Diagnostics::sample(dispatch_depth),
    }
}
