//! Per-frame Touch Table ingest (§4.6 steps 1-3): upsert every tip-active
//! contact, query the Binding Index for its current key, and lock/refresh
//! the Touch Table entry accordingly.

use core_events::{Frame, MAX_CONTACTS, Side};
use core_keymap::{BindingIndex, Keymap};
use core_state::TouchTable;
use smallvec::SmallVec;

pub type ActiveIds = SmallVec<[u32; MAX_CONTACTS]>;

/// Upsert every tip-active contact in `frame` into `table`, resolve its
/// current binding against `index`, and return the ids active this frame.
#[allow(clippy::too_many_arguments)]
pub fn ingest(
    table: &mut TouchTable,
    side: Side,
    frame: &Frame,
    keymap: &Keymap,
    index: &BindingIndex,
    preset: &str,
    layer: u8,
    snap_radius: f32,
    now_ticks: i64,
) -> ActiveIds {
    let mut active = ActiveIds::new();
    let custom_buttons = keymap.custom_buttons(preset, layer);

    for contact in frame.tip_active_contacts() {
        let (x, y) = contact.normalized(frame.max_x, frame.max_y);
        let entry = table.upsert((side, contact.id), now_ticks, x, y);
        active.push(contact.id);

        if let Some(hit) = index.hit(side, custom_buttons, snap_radius, x, y) {
            entry.observe_key(hit);
        }
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{Contact, ContactFlags};
    use core_keymap::{ColumnSettings, LayoutPreset, build_layouts};

    fn index() -> BindingIndex {
        let preset = LayoutPreset::grid_6x3();
        let columns = ColumnSettings::uniform(preset.cols);
        let (left, right) = build_layouts(&preset, &columns);
        BindingIndex::new(&left, &right)
    }

    #[test]
    fn ingest_locks_binding_hit_for_new_contacts() {
        let mut table = TouchTable::new();
        let idx = index();
        let keymap = Keymap::empty();

        let mut frame = Frame::new(0, 0, 0, 100, 100);
        frame.push_contact(Contact::new(1, 5, 5, ContactFlags::TIP | ContactFlags::CONFIDENCE));

        let active = ingest(&mut table, Side::Right, &frame, &keymap, &idx, "6x3", 0, 0.05, 0);
        assert_eq!(active.as_slice(), &[1]);
        assert!(table.find((Side::Right, 1)).unwrap().last_key.is_some());
    }

    #[test]
    fn ingest_ignores_hover_only_contacts() {
        let mut table = TouchTable::new();
        let idx = index();
        let keymap = Keymap::empty();

        let mut frame = Frame::new(0, 0, 0, 100, 100);
        frame.push_contact(Contact::new(1, 5, 5, ContactFlags::CONFIDENCE));

        let active = ingest(&mut table, Side::Right, &frame, &keymap, &idx, "6x3", 0, 0.05, 0);
        assert!(active.is_empty());
    }
}
