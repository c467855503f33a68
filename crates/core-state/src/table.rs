//! Touch Table (C4): fixed-capacity open-addressed map keyed by
//! `(side, contact_id)`. Capacity is a power of two sized to keep load
//! factor ≤ 0.5 (§4.4).

use core_events::{MAX_CONTACTS, Side};
use core_keymap::BindingHit;

/// `4 * MAX_CONTACTS_PER_SIDE`, rounded up to the next power of two.
const CAPACITY: usize = (4 * MAX_CONTACTS).next_power_of_two();

pub type TouchKey = (Side, u32);

/// Per-contact bookkeeping the Intent State Machine reads and mutates every
/// frame (§3). `initial_x`/`initial_y`/`last_x`/`last_y` are tracked in
/// normalized coordinates in addition to the spec's named fields because
/// `TAP_MOTION`/`DRAG_CANCEL` are defined in terms of centroid motion, not
/// key identity alone.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchTableEntry {
    pub side: Side,
    pub contact_id: u32,
    pub first_seen_ticks: i64,
    pub last_seen_ticks: i64,
    pub initial_key: Option<BindingHit>,
    pub last_key: Option<BindingHit>,
    pub initial_x: f32,
    pub initial_y: f32,
    pub last_x: f32,
    pub last_y: f32,
    pub held: bool,
    pub hold_fired: bool,
    pub repeat_token: u64,
    pub snap_counted: bool,
}

impl TouchTableEntry {
    fn new(side: Side, contact_id: u32, ticks: i64, x: f32, y: f32, repeat_token: u64) -> Self {
        Self {
            side,
            contact_id,
            first_seen_ticks: ticks,
            last_seen_ticks: ticks,
            initial_key: None,
            last_key: None,
            initial_x: x,
            initial_y: y,
            last_x: x,
            last_y: y,
            held: false,
            hold_fired: false,
            repeat_token,
            snap_counted: false,
        }
    }

    pub fn age_ticks(&self, now_ticks: i64) -> i64 {
        (now_ticks - self.first_seen_ticks).max(0)
    }

    pub fn motion_from_initial(&self) -> f32 {
        ((self.last_x - self.initial_x).powi(2) + (self.last_y - self.initial_y).powi(2)).sqrt()
    }

    /// Lock `initial_key` on first observation; always refresh `last_key`
    /// (§4.6 step 3: "initial key is locked at first frame; update last_key").
    pub fn observe_key(&mut self, hit: BindingHit) {
        if self.initial_key.is_none() {
            self.initial_key = Some(hit.clone());
        }
        self.last_key = Some(hit);
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Empty,
    Occupied(TouchTableEntry),
    /// Left behind by `remove` so linear probing can still find entries that
    /// were inserted after a collision at this slot.
    Tombstone,
}

#[derive(Debug)]
pub struct TouchTable {
    slots: Vec<Slot>,
    len: usize,
    next_repeat_token: u64,
}

fn hash_key(key: TouchKey) -> usize {
    let (side, id) = key;
    let mixed = (side.index() as u64).wrapping_mul(0x9E3779B97F4A7C15) ^ (id as u64);
    mixed as usize
}

impl TouchTable {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::Empty; CAPACITY],
            len: 0,
            next_repeat_token: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn probe(&self, key: TouchKey) -> usize {
        let mask = CAPACITY - 1;
        let mut idx = hash_key(key) & mask;
        loop {
            match &self.slots[idx] {
                Slot::Occupied(entry) if (entry.side, entry.contact_id) == key => return idx,
                Slot::Empty => return idx,
                _ => idx = (idx + 1) & mask,
            }
        }
    }

    pub fn find(&self, key: TouchKey) -> Option<&TouchTableEntry> {
        let idx = self.probe(key);
        match &self.slots[idx] {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn find_mut(&mut self, key: TouchKey) -> Option<&mut TouchTableEntry> {
        let idx = self.probe(key);
        match &mut self.slots[idx] {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    /// Insert a fresh entry (or return the existing one) for `key`, seeded
    /// at `(x, y)` and `now_ticks`.
    pub fn upsert(&mut self, key: TouchKey, now_ticks: i64, x: f32, y: f32) -> &mut TouchTableEntry {
        let idx = self.probe(key);
        if let Slot::Occupied(_) = &self.slots[idx] {
            let Slot::Occupied(entry) = &mut self.slots[idx] else {
                unreachable!()
            };
            entry.last_seen_ticks = now_ticks;
            entry.last_x = x;
            entry.last_y = y;
            return entry;
        }

        if self.len + 1 > CAPACITY / 2 {
            tracing::warn!(target: "core_state", "touch table exceeding intended load factor");
        }
        let token = self.next_repeat_token;
        self.next_repeat_token = self.next_repeat_token.wrapping_add(1).max(1);
        self.slots[idx] = Slot::Occupied(TouchTableEntry::new(key.0, key.1, now_ticks, x, y, token));
        self.len += 1;
        let Slot::Occupied(entry) = &mut self.slots[idx] else {
            unreachable!()
        };
        entry
    }

    pub fn remove(&mut self, key: TouchKey) -> Option<TouchTableEntry> {
        let idx = self.probe(key);
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(entry) => {
                self.len -= 1;
                Some(entry)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchTableEntry> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        })
    }

    pub fn iter_side(&self, side: Side) -> impl Iterator<Item = &TouchTableEntry> {
        self.iter().filter(move |e| e.side == side)
    }
}

impl Default for TouchTable {
    fn default() -> Self {
        Self::new()
    }
}
