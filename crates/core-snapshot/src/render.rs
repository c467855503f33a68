//! Render Snapshot (§3, §4.9): per-side active contact positions, the
//! highlighted key per side, the current layer, and a frame sequence number,
//! all versioned by a monotonically increasing `revision`.

use core_events::{MAX_CONTACTS, Side};
use core_keymap::BindingHit;

/// One active contact's position in normalized coordinates, as published to
/// UI readers. Plain `Copy` data so a full side's worth fits on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPosition {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

const EMPTY_CONTACT: ContactPosition = ContactPosition { id: 0, x: 0.0, y: 0.0 };

/// Fixed-capacity list of the active contacts on one side. Backing storage is
/// a stack array sized to `MAX_CONTACTS`, matching `core_events::Frame`'s
/// own fixed layout, so publishing a frame's contacts never allocates.
#[derive(Debug, Clone, Copy)]
pub struct SideContacts {
    count: u8,
    contacts: [ContactPosition; MAX_CONTACTS],
}

impl SideContacts {
    pub const fn empty() -> Self {
        Self {
            count: 0,
            contacts: [EMPTY_CONTACT; MAX_CONTACTS],
        }
    }

    /// Build from an iterator, truncating past `MAX_CONTACTS`. The Touch
    /// Table already enforces that cap upstream, so truncation here is a
    /// defensive no-op rather than a real data-loss path.
    pub fn from_iter(iter: impl IntoIterator<Item = ContactPosition>) -> Self {
        let mut out = Self::empty();
        for c in iter.into_iter().take(MAX_CONTACTS) {
            out.contacts[out.count as usize] = c;
            out.count += 1;
        }
        out
    }

    pub fn as_slice(&self) -> &[ContactPosition] {
        &self.contacts[..self.count as usize]
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for SideContacts {
    fn default() -> Self {
        Self::empty()
    }
}

/// Engine-computed per-side delta applied to advance the render snapshot by
/// one revision (§4.9). The Touch Processor Core builds one of these per
/// side it processes a frame for; the side not touched this frame carries
/// its previous contacts and highlight forward unchanged.
#[derive(Debug, Clone)]
pub struct RenderPatch {
    pub side: Side,
    pub contacts: SideContacts,
    pub highlighted_key: Option<BindingHit>,
    pub layer: u8,
    pub frame_seq: u64,
}

#[derive(Debug, Clone, Default)]
struct RenderSideState {
    contacts: SideContacts,
    highlighted_key: Option<BindingHit>,
}

/// Atomically-published render state (§3 `RenderSnapshot`). `revision`
/// increases by exactly one per applied patch (§8, snapshot monotonicity).
#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    pub revision: u64,
    pub layer: u8,
    pub frame_seq: u64,
    sides: [RenderSideState; 2],
}

impl RenderSnapshot {
    pub fn contacts(&self, side: Side) -> &[ContactPosition] {
        self.sides[side.index()].contacts.as_slice()
    }

    pub fn highlighted_key(&self, side: Side) -> Option<&BindingHit> {
        self.sides[side.index()].highlighted_key.as_ref()
    }

    /// Apply `patch` on top of this snapshot, returning the next revision.
    /// Only the patched side's contacts/highlight change; the other side's
    /// last-published state carries forward.
    pub fn apply(&self, patch: RenderPatch) -> RenderSnapshot {
        let mut sides = self.sides.clone();
        sides[patch.side.index()] = RenderSideState {
            contacts: patch.contacts,
            highlighted_key: patch.highlighted_key,
        };
        RenderSnapshot {
            revision: self.revision + 1,
            layer: patch.layer,
            frame_seq: patch.frame_seq,
            sides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: u32, x: f32, y: f32) -> ContactPosition {
        ContactPosition { id, x, y }
    }

    #[test]
    fn apply_bumps_revision_by_exactly_one() {
        let snap = RenderSnapshot::default();
        let patch = RenderPatch {
            side: Side::Left,
            contacts: SideContacts::from_iter([contact(1, 0.1, 0.2)]),
            highlighted_key: None,
            layer: 0,
            frame_seq: 1,
        };
        let next = snap.apply(patch);
        assert_eq!(next.revision, 1);
        let next2 = next.clone().apply(RenderPatch {
            side: Side::Right,
            contacts: SideContacts::empty(),
            highlighted_key: None,
            layer: 0,
            frame_seq: 2,
        });
        assert_eq!(next2.revision, 2);
    }

    #[test]
    fn patching_one_side_preserves_the_other_sides_last_state() {
        let snap = RenderSnapshot::default().apply(RenderPatch {
            side: Side::Left,
            contacts: SideContacts::from_iter([contact(7, 0.5, 0.5)]),
            highlighted_key: Some(BindingHit::Grid { row: 1, col: 2 }),
            layer: 0,
            frame_seq: 1,
        });

        let next = snap.apply(RenderPatch {
            side: Side::Right,
            contacts: SideContacts::empty(),
            highlighted_key: None,
            layer: 0,
            frame_seq: 2,
        });

        assert_eq!(next.contacts(Side::Left), &[contact(7, 0.5, 0.5)]);
        assert_eq!(next.highlighted_key(Side::Left), Some(&BindingHit::Grid { row: 1, col: 2 }));
    }

    #[test]
    fn side_contacts_truncates_past_capacity() {
        let iter = (0..(MAX_CONTACTS as u32 + 3)).map(|id| contact(id, 0.0, 0.0));
        let side = SideContacts::from_iter(iter);
        assert_eq!(side.len(), MAX_CONTACTS);
    }
}
