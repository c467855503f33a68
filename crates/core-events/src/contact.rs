//! Contact and Frame value types (§3). Both are plain fixed-size data: the
//! capture collaborator constructs them and hands them to the engine by
//! value, retaining no references (§6 inbound frame interface contract).

use bitflags::bitflags;

/// Maximum simultaneous contacts the core tracks per frame. PTP hardware
/// reports at most 5; evdev devices that report more are truncated by the
/// capture collaborator before `submit_frame`, with the excess counted in
/// `CAPTURE_FRAME_OVERFLOW` (§3, §8 invariant 3).
pub const MAX_CONTACTS: usize = 5;

bitflags! {
    /// Bit layout matches §3: bit 0 is confidence, bit 1 is tip.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContactFlags: u8 {
        const CONFIDENCE = 0b0000_0001;
        const TIP = 0b0000_0010;
    }
}

impl ContactFlags {
    pub fn is_tip(self) -> bool {
        self.contains(ContactFlags::TIP)
    }

    pub fn is_confident(self) -> bool {
        self.contains(ContactFlags::CONFIDENCE)
    }
}

/// One finger's state within a single `Frame`. `id` is stable across frames
/// while the finger is tracked and is reassigned only on lift/land (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    pub flags: ContactFlags,
    pub pressure: u8,
    pub phase: u8,
    pub has_force: bool,
}

impl Contact {
    pub const fn new(id: u32, x: u16, y: u16, flags: ContactFlags) -> Self {
        Self {
            id,
            x,
            y,
            flags,
            pressure: 0,
            phase: 0,
            has_force: false,
        }
    }

    pub fn is_tip_active(&self) -> bool {
        self.flags.is_tip()
    }

    /// Normalize this contact's position into `[0,1]` given the per-frame
    /// scale factors (§4.1: "the core consumes u16 positions paired with
    /// max_x, max_y scale factors supplied per frame").
    pub fn normalized(&self, max_x: u16, max_y: u16) -> (f32, f32) {
        let nx = if max_x == 0 {
            0.0
        } else {
            self.x as f32 / max_x as f32
        };
        let ny = if max_y == 0 {
            0.0
        } else {
            self.y as f32 / max_y as f32
        };
        (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }
}

/// Which physical trackpad (or logical half of one) a frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Immutable per-report snapshot of all contacts plus button/timing metadata
/// (§3). `contacts` beyond `contact_count` are ignored by every reader;
/// truncation/overflow is the capture collaborator's job before the frame
/// reaches `submit_frame`, with this type only asserting the invariant via
/// `push_contact`'s `Result`.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub arrival_ticks: i64,
    pub report_id: u8,
    pub scan_time: u16,
    pub button_clicked: bool,
    pub max_x: u16,
    pub max_y: u16,
    contact_count: u8,
    contacts: [Contact; MAX_CONTACTS],
}

const EMPTY_CONTACT: Contact = Contact::new(0, 0, 0, ContactFlags::empty());

impl Frame {
    pub fn new(arrival_ticks: i64, report_id: u8, scan_time: u16, max_x: u16, max_y: u16) -> Self {
        Self {
            arrival_ticks,
            report_id,
            scan_time,
            button_clicked: false,
            max_x,
            max_y,
            contact_count: 0,
            contacts: [EMPTY_CONTACT; MAX_CONTACTS],
        }
    }

    /// Append a contact, returning `false` (and leaving the frame unchanged)
    /// once `MAX_CONTACTS` is reached. Callers that need to count overflow
    /// (§8 invariant 3) should track how many `push_contact` calls returned
    /// `false` themselves; this type has no allocation-free way to surface a
    /// running count beyond that.
    pub fn push_contact(&mut self, contact: Contact) -> bool {
        if self.contact_count as usize >= MAX_CONTACTS {
            return false;
        }
        self.contacts[self.contact_count as usize] = contact;
        self.contact_count += 1;
        true
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count as usize
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts[..self.contact_count as usize]
    }

    pub fn tip_active_contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts().iter().filter(|c| c.is_tip_active())
    }
}
