//! `RFV3` frame payload (§4.10): one touch frame as a fixed 20-byte header
//! plus a 40-byte record per contact.

use crate::error::CodecError;

pub const FRAME_MAGIC: u32 = 0x3356_4652;
const FRAME_HEADER_LEN: usize = 20;
const CONTACT_RECORD_LEN: usize = 40;

/// Canonical contact lifecycle state (§4.10), codes 0..7. `Hovering`,
/// `Lingering`, and `Leaving` carry tip off while still tracked; the
/// remaining states are observed with tip on (or, for `NotTouching`,
/// absent entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    NotTouching = 0,
    Starting = 1,
    Hovering = 2,
    Making = 3,
    Touching = 4,
    Breaking = 5,
    Lingering = 6,
    Leaving = 7,
}

impl ContactState {
    fn from_u8(value: u8) -> Result<Self, CodecError> {
        match value {
            0 => Ok(ContactState::NotTouching),
            1 => Ok(ContactState::Starting),
            2 => Ok(ContactState::Hovering),
            3 => Ok(ContactState::Making),
            4 => Ok(ContactState::Touching),
            5 => Ok(ContactState::Breaking),
            6 => Ok(ContactState::Lingering),
            7 => Ok(ContactState::Leaving),
            other => Err(CodecError::InvalidStateCode(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub total: f32,
    pub pressure: f32,
    pub major_axis: f32,
    pub minor_axis: f32,
    pub angle: f32,
    pub density: f32,
    pub state: ContactState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub seq: u64,
    pub timestamp_sec: f64,
    pub device_numeric_id: u64,
    pub contacts: Vec<ContactRecord>,
}

pub fn encode_frame(frame: &FrameRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + frame.contacts.len() * CONTACT_RECORD_LEN);
    buf.extend_from_slice(&FRAME_MAGIC.to_le_bytes());
    buf.extend_from_slice(&frame.seq.to_le_bytes());
    buf.extend_from_slice(&frame.timestamp_sec.to_le_bytes());
    buf.extend_from_slice(&frame.device_numeric_id.to_le_bytes());
    buf.extend_from_slice(&(frame.contacts.len() as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());

    for contact in &frame.contacts {
        buf.extend_from_slice(&contact.id.to_le_bytes());
        buf.extend_from_slice(&contact.x.to_le_bytes());
        buf.extend_from_slice(&contact.y.to_le_bytes());
        buf.extend_from_slice(&contact.total.to_le_bytes());
        buf.extend_from_slice(&contact.pressure.to_le_bytes());
        buf.extend_from_slice(&contact.major_axis.to_le_bytes());
        buf.extend_from_slice(&contact.minor_axis.to_le_bytes());
        buf.extend_from_slice(&contact.angle.to_le_bytes());
        buf.extend_from_slice(&contact.density.to_le_bytes());
        buf.push(contact.state as u8);
        buf.extend_from_slice(&[0, 0, 0]);
    }
    buf
}

pub fn decode_frame(payload: &[u8]) -> Result<FrameRecord, CodecError> {
    if payload.len() < FRAME_HEADER_LEN {
        return Err(CodecError::TruncatedRecordPayload);
    }

    let magic = u32::from_le_bytes(payload[0..4].try_into().unwrap());
    if magic != FRAME_MAGIC {
        return Err(CodecError::FramePayloadMagicMismatch);
    }

    let seq = u64::from_le_bytes(payload[4..12].try_into().unwrap());
    let timestamp_sec = f64::from_le_bytes(payload[12..20].try_into().unwrap());
    let device_numeric_id = u64::from_le_bytes(payload[20..28].try_into().unwrap());
    let contact_count = u16::from_le_bytes(payload[28..30].try_into().unwrap()) as usize;

    let expected_len = FRAME_HEADER_LEN + contact_count * CONTACT_RECORD_LEN;
    if payload.len() != expected_len {
        return Err(CodecError::InvalidPayloadLength(payload.len() as i32));
    }

    let mut contacts = Vec::with_capacity(contact_count);
    for i in 0..contact_count {
        let base = FRAME_HEADER_LEN + i * CONTACT_RECORD_LEN;
        let field = payload[base..base + CONTACT_RECORD_LEN].try_into().unwrap();
        contacts.push(decode_contact(field)?);
    }

    Ok(FrameRecord { seq, timestamp_sec, device_numeric_id, contacts })
}

fn decode_contact(field: [u8; CONTACT_RECORD_LEN]) -> Result<ContactRecord, CodecError> {
    let f32_at = |range: std::ops::Range<usize>| f32::from_le_bytes(field[range].try_into().unwrap());
    Ok(ContactRecord {
        id: i32::from_le_bytes(field[0..4].try_into().unwrap()),
        x: f32_at(4..8),
        y: f32_at(8..12),
        total: f32_at(12..16),
        pressure: f32_at(16..20),
        major_axis: f32_at(20..24),
        minor_axis: f32_at(24..28),
        angle: f32_at(28..32),
        density: f32_at(32..36),
        state: ContactState::from_u8(field[36])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contact(id: i32) -> ContactRecord {
        ContactRecord {
            id,
            x: 0.25,
            y: 0.75,
            total: 1.0,
            pressure: 0.5,
            major_axis: 0.1,
            minor_axis: 0.05,
            angle: 0.0,
            density: 0.9,
            state: ContactState::Touching,
        }
    }

    #[test]
    fn frame_round_trips_through_encode_and_decode() {
        let frame = FrameRecord {
            seq: 7,
            timestamp_sec: 12.5,
            device_numeric_id: 99,
            contacts: vec![sample_contact(1), sample_contact(2)],
        };
        let encoded = encode_frame(&frame);
        let decoded = decode_frame(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut encoded = encode_frame(&FrameRecord {
            seq: 0,
            timestamp_sec: 0.0,
            device_numeric_id: 0,
            contacts: vec![],
        });
        encoded[0] ^= 0xff;
        assert!(matches!(decode_frame(&encoded), Err(CodecError::FramePayloadMagicMismatch)));
    }

    #[test]
    fn contact_count_mismatch_with_payload_length_is_rejected() {
        let mut encoded = encode_frame(&FrameRecord {
            seq: 0,
            timestamp_sec: 0.0,
            device_numeric_id: 0,
            contacts: vec![sample_contact(1)],
        });
        encoded.truncate(encoded.len() - 10);
        assert!(matches!(decode_frame(&encoded), Err(CodecError::InvalidPayloadLength(_))));
    }

    #[test]
    fn invalid_state_code_is_rejected() {
        let mut encoded = encode_frame(&FrameRecord {
            seq: 0,
            timestamp_sec: 0.0,
            device_numeric_id: 0,
            contacts: vec![sample_contact(1)],
        });
        let state_offset = FRAME_HEADER_LEN + 36;
        encoded[state_offset] = 9;
        assert!(matches!(decode_frame(&encoded), Err(CodecError::InvalidStateCode(9))));
    }

    fn contact_state_strategy() -> impl proptest::strategy::Strategy<Value = ContactState> {
        use proptest::prelude::Just;
        proptest::prop_oneof![
            Just(ContactState::NotTouching),
            Just(ContactState::Starting),
            Just(ContactState::Hovering),
            Just(ContactState::Making),
            Just(ContactState::Touching),
            Just(ContactState::Breaking),
            Just(ContactState::Lingering),
            Just(ContactState::Leaving),
        ]
    }

    fn contact_strategy() -> impl proptest::strategy::Strategy<Value = ContactRecord> {
        use proptest::prelude::*;
        (
            (any::<i32>(), -1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0),
            (-1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0),
            contact_state_strategy(),
        )
            .prop_map(|((id, x, y, total), (pressure, major_axis, minor_axis, angle), state)| ContactRecord {
                id,
                x,
                y,
                total,
                pressure,
                major_axis,
                minor_axis,
                angle,
                density: 0.0,
                state,
            })
    }

    proptest::proptest! {
        #[test]
        fn frame_round_trips_for_arbitrary_contacts(
            seq in proptest::prelude::any::<u64>(),
            device_numeric_id in proptest::prelude::any::<u64>(),
            contacts in proptest::collection::vec(contact_strategy(), 0..8),
        ) {
            let frame = FrameRecord { seq, timestamp_sec: 0.0, device_numeric_id, contacts };
            let encoded = encode_frame(&frame);
            let decoded = decode_frame(&encoded).unwrap();
            proptest::prop_assert_eq!(decoded, frame);
        }
    }
}
