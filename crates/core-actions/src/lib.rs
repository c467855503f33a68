//! Touch Processor Core (C6, §4.6): the pure-ish per-frame pipeline that
//! turns one side's `Frame` into dispatch events and snapshot patches.
//! "Pure" here means no I/O and no background work — `process()` mutates
//! the `CoreState` it's handed directly rather than threading a
//! previous/next state pair through, matching the single-writer ownership
//! the Engine Actor already enforces upstream.

pub mod emit;
pub mod patch;
pub mod table;

use core_config::TouchProcessorConfig;
use core_events::{DispatchEvent, Frame, MAX_CONTACTS, Side};
use core_keymap::{BindingIndex, Keymap};
use core_snapshot::{RenderPatch, StatusPatch};
use core_state::CoreState;

/// Everything one `process()` call produces: the dispatch events to post to
/// the queue, and the render/status patches to publish.
pub struct ProcessOutput {
    pub dispatch: Vec<DispatchEvent>,
    pub render_patch: RenderPatch,
    pub status_patch: StatusPatch,
}

fn centroid_of(table: &core_state::TouchTable, side: Side) -> (f32, f32) {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut n = 0.0f32;
    for entry in table.iter_side(side) {
        sum_x += entry.last_x;
        sum_y += entry.last_y;
        n += 1.0;
    }
    if n == 0.0 { (0.0, 0.0) } else { (sum_x / n, sum_y / n) }
}

/// Advance `state` by one frame on `side`: ingest contacts into the Touch
/// Table, step the swipe aggregator and Intent State Machine, resolve any
/// emitted intents against `keymap`, and build the render/status patches
/// this frame produced. `dispatch_depth` is the caller-sampled dispatch
/// ring depth (the ring lives in `core-dispatch`, owned by the Engine
/// Actor, not here) folded into the status patch's diagnostics.
#[allow(clippy::too_many_arguments)]
pub fn process(
    state: &mut CoreState,
    keymap: &Keymap,
    index: &BindingIndex,
    config: &TouchProcessorConfig,
    preset: &str,
    side: Side,
    frame: &Frame,
    now_ticks: i64,
    frame_seq: u64,
    dispatch_depth: usize,
) -> ProcessOutput {
    let layer = state.layers.active_layer();
    let active_ids = table::ingest(
        &mut state.table,
        side,
        frame,
        keymap,
        index,
        preset,
        layer,
        config.snap_radius,
        now_ticks,
    );

    if active_ids.len() == MAX_CONTACTS {
        let centroid = centroid_of(&state.table, side);
        if state.swipe.observe(side, centroid, now_ticks, config) {
            state.typing_enabled = !state.typing_enabled;
        }
    }

    let typing_enabled = state.typing_enabled;
    let button_clicked = frame.button_clicked;
    let side_idx = side.index();
    let intent_events = {
        let (table, side_state) = (&mut state.table, &mut state.sides[side_idx]);
        side_state.step(table, side, &active_ids, config, now_ticks, typing_enabled, button_clicked)
    };

    let contacts = frame.contacts();
    let dispatch = intent_events
        .into_iter()
        .filter_map(|event| emit::translate(state, keymap, preset, side, contacts, event, now_ticks))
        .collect();

    let keyboard_mode = state.keyboard_mode;
    ProcessOutput {
        render_patch: patch::render_patch(state, side, frame_seq),
        status_patch: patch::status_patch(state, side, active_ids.len() as u8, dispatch_depth, keyboard_mode),
        dispatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{Contact, ContactFlags, DispatchKind, KeyAction, SemanticAction};
    use core_keymap::{ColumnSettings, KeyMapping, LayoutPreset, StorageKey, build_layouts};

    fn fixture() -> (Keymap, BindingIndex, TouchProcessorConfig) {
        let preset = LayoutPreset::grid_6x3();
        let columns = ColumnSettings::uniform(preset.cols);
        let (left, right) = build_layouts(&preset, &columns);
        let index = BindingIndex::new(&left, &right);

        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("A", SemanticAction::Letter('a')),
                hold: None,
            },
        );

        (keymap, index, TouchProcessorConfig::default())
    }

    #[test]
    fn a_quick_tap_on_a_mapped_key_emits_key_tap_and_idles_back() {
        let (keymap, index, config) = fixture();
        let mut state = CoreState::default();

        let mut frame = Frame::new(0, 0, 0, 1000, 1000);
        // Grid key (0,0) sits near the pad's origin corner.
        frame.push_contact(Contact::new(1, 20, 20, ContactFlags::TIP | ContactFlags::CONFIDENCE));

        let down = process(&mut state, &keymap, &index, &config, "6x3", Side::Right, &frame, 0, 1, 0);
        assert!(down.dispatch.is_empty(), "first frame only locks the candidate, no dispatch yet");

        let release_frame = Frame::new(0, 0, 0, 1000, 1000);
        let released = process(&mut state, &keymap, &index, &config, "6x3", Side::Right, &release_frame, 50, 2, 0);

        assert_eq!(released.dispatch.len(), 1);
        assert_eq!(released.dispatch[0].kind, DispatchKind::KeyTap(SemanticAction::Letter('a')));
    }

    #[test]
    fn render_and_status_patches_describe_the_processed_side() {
        let (keymap, index, config) = fixture();
        let mut state = CoreState::default();

        let mut frame = Frame::new(0, 0, 0, 1000, 1000);
        frame.push_contact(Contact::new(1, 20, 20, ContactFlags::TIP | ContactFlags::CONFIDENCE));

        let out = process(&mut state, &keymap, &index, &config, "6x3", Side::Right, &frame, 0, 9, 3);
        assert_eq!(out.render_patch.side, Side::Right);
        assert_eq!(out.render_patch.frame_seq, 9);
        assert_eq!(out.render_patch.contacts.len(), 1);
        assert_eq!(out.status_patch.contact_count, 1);
        assert_eq!(out.status_patch.diagnostics.dispatch_depth, 3);
    }
}
