//! Maps codec wire types (`core_codec::{FrameRecord, ContactRecord}`) onto
//! the core pipeline's `core_events::{Frame, Contact}`.
//!
//! Capture fixtures carry normalized `[0,1]` positions; the pipeline wants
//! `u16` positions paired with a `max_x`/`max_y` scale (§4.1), so replay
//! picks a fixed full-range scale and multiplies back up. Force-touch state
//! has no wire representation in `ATPCAP01` (no hardware captured it), so
//! every replayed contact reports `has_force: false` — `ForceClick`/
//! `CornerForce` bindings are therefore untestable through replay alone.

use core_codec::{ContactRecord, ContactState, FrameRecord};
use core_events::{Contact, ContactFlags, Frame, Side};

const REPLAY_COORD_SCALE: u16 = u16::MAX;

pub fn side_from_hint(side_hint: u8) -> Side {
    if side_hint == 0 { Side::Left } else { Side::Right }
}

/// `button_clicked` has no wire representation either (§4.10's `RFV3`
/// payload carries no button field), so every replayed frame reports it as
/// `false`; mechanical-click bindings are untestable through replay alone,
/// the same limitation as force touch.
pub fn to_frame(record: &FrameRecord, arrival_ticks: i64) -> Frame {
    let mut frame = Frame::new(arrival_ticks, 0, 0, REPLAY_COORD_SCALE, REPLAY_COORD_SCALE);
    for contact in &record.contacts {
        frame.push_contact(to_contact(contact));
    }
    frame
}

fn to_contact(record: &ContactRecord) -> Contact {
    let x = scale(record.x);
    let y = scale(record.y);
    // §4.10: Hovering/Lingering/Leaving carry tip off but stay tracked
    // (confidence set); NotTouching reports no contact at all.
    let flags = match record.state {
        ContactState::NotTouching => ContactFlags::empty(),
        ContactState::Starting | ContactState::Hovering | ContactState::Lingering | ContactState::Leaving => {
            ContactFlags::CONFIDENCE
        }
        ContactState::Making | ContactState::Touching | ContactState::Breaking => {
            ContactFlags::TIP | ContactFlags::CONFIDENCE
        }
    };
    let mut contact = Contact::new(record.id as u32, x, y, flags);
    contact.pressure = (record.pressure.clamp(0.0, 1.0) * 255.0) as u8;
    contact
}

fn scale(fraction: f32) -> u16 {
    (fraction.clamp(0.0, 1.0) * REPLAY_COORD_SCALE as f32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(state: ContactState) -> ContactRecord {
        ContactRecord {
            id: 1,
            x: 0.5,
            y: 0.25,
            total: 1.0,
            pressure: 0.5,
            major_axis: 0.0,
            minor_axis: 0.0,
            angle: 0.0,
            density: 0.0,
            state,
        }
    }

    #[test]
    fn touching_state_maps_to_tip_and_confident() {
        let contact = to_contact(&contact(ContactState::Touching));
        assert!(contact.flags.is_tip());
        assert!(contact.flags.is_confident());
    }

    #[test]
    fn making_and_breaking_states_also_carry_tip() {
        assert!(to_contact(&contact(ContactState::Making)).flags.is_tip());
        assert!(to_contact(&contact(ContactState::Breaking)).flags.is_tip());
    }

    #[test]
    fn hovering_lingering_and_leaving_are_tracked_without_tip() {
        for state in [ContactState::Hovering, ContactState::Lingering, ContactState::Leaving] {
            let contact = to_contact(&contact(state));
            assert!(!contact.flags.is_tip());
            assert!(contact.flags.is_confident());
        }
    }

    #[test]
    fn not_touching_state_maps_to_no_flags() {
        let contact = to_contact(&contact(ContactState::NotTouching));
        assert!(!contact.flags.is_tip());
        assert!(!contact.flags.is_confident());
    }

    #[test]
    fn normalized_position_scales_into_the_full_u16_range() {
        let contact = to_contact(&contact(ContactState::Touching));
        assert!(contact.x > 32000 && contact.x < 33000);
    }
}
