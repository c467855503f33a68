//! Status Snapshot (§3, §4.9): per-side intent mode and contact count, the
//! active layer, the typing/keyboard-mode flags, and diagnostic counters,
//! all versioned alongside the render snapshot's `revision`.

use core_events::{ReleaseDroppedReason, Side};
use core_state::IntentMode;

/// Tally of `ReleaseDropped` events by reason (§4.5, §7), mirroring the
/// four global counters in `core_events` so a status reader can see the
/// breakdown without touching the atomics directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseDroppedCounts {
    pub hold_consumed: u64,
    pub drag_cancel: u64,
    pub off_key_no_snap: u64,
    pub tap_gesture_active: u64,
}

impl ReleaseDroppedCounts {
    pub fn sample() -> Self {
        use std::sync::atomic::Ordering::Relaxed;
        Self {
            hold_consumed: core_events::RELEASE_DROPPED_HOLD_CONSUMED.load(Relaxed),
            drag_cancel: core_events::RELEASE_DROPPED_DRAG_CANCEL.load(Relaxed),
            off_key_no_snap: core_events::RELEASE_DROPPED_OFF_KEY_NO_SNAP.load(Relaxed),
            tap_gesture_active: core_events::RELEASE_DROPPED_TAP_GESTURE_ACTIVE.load(Relaxed),
        }
    }

    pub fn get(&self, reason: ReleaseDroppedReason) -> u64 {
        match reason {
            ReleaseDroppedReason::HoldConsumed => self.hold_consumed,
            ReleaseDroppedReason::DragCancel => self.drag_cancel,
            ReleaseDroppedReason::OffKeyNoSnap => self.off_key_no_snap,
            ReleaseDroppedReason::TapGestureActive => self.tap_gesture_active,
        }
    }
}

/// Soft-error and throughput counters surfaced in `StatusSnapshot.diagnostics`
/// (§4.11). Runtime soft errors never escape the core; they are counted here
/// instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub capture_frames: u64,
    pub capture_frame_overflow: u64,
    pub capture_frame_non_monotonic: u64,
    pub engine_frames: u64,
    pub dispatch_depth: usize,
    pub dispatch_dropped: u64,
    pub release_dropped_by_reason: ReleaseDroppedCounts,
}

impl Diagnostics {
    /// Snapshot every global telemetry counter plus the caller-supplied
    /// dispatch ring depth — the ring has no global atomic of its own, so
    /// its current depth is read directly from the live queue by the caller
    /// (the Engine Actor) and passed in here.
    pub fn sample(dispatch_depth: usize) -> Self {
        use std::sync::atomic::Ordering::Relaxed;
        Self {
            capture_frames: core_events::CAPTURE_FRAMES.load(Relaxed),
            capture_frame_overflow: core_events::CAPTURE_FRAME_OVERFLOW.load(Relaxed),
            capture_frame_non_monotonic: core_events::CAPTURE_FRAME_NON_MONOTONIC.load(Relaxed),
            engine_frames: core_events::ENGINE_FRAMES.load(Relaxed),
            dispatch_depth,
            dispatch_dropped: core_events::DISPATCH_DROPPED.load(Relaxed),
            release_dropped_by_reason: ReleaseDroppedCounts::sample(),
        }
    }
}

/// Engine-computed per-side delta applied to advance the status snapshot by
/// one revision, mirroring `RenderPatch`.
#[derive(Debug, Clone)]
pub struct StatusPatch {
    pub side: Side,
    pub intent: IntentMode,
    pub contact_count: u8,
    pub layer: u8,
    pub typing_enabled: bool,
    pub keyboard_mode: bool,
    pub diagnostics: Diagnostics,
}

/// Atomically-published status state (§3 `StatusSnapshot`).
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub revision: u64,
    pub intent_by_side: [IntentMode; 2],
    pub contact_count_by_side: [u8; 2],
    pub layer: u8,
    pub typing_enabled: bool,
    pub keyboard_mode: bool,
    pub diagnostics: Diagnostics,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            revision: 0,
            intent_by_side: [IntentMode::Idle; 2],
            contact_count_by_side: [0; 2],
            layer: 0,
            typing_enabled: true,
            keyboard_mode: false,
            diagnostics: Diagnostics::default(),
        }
    }
}

impl StatusSnapshot {
    /// Apply `patch`, returning the next revision. Only the patched side's
    /// intent/contact count change; the unpatched side carries forward.
    pub fn apply(&self, patch: StatusPatch) -> StatusSnapshot {
        let mut intent_by_side = self.intent_by_side;
        let mut contact_count_by_side = self.contact_count_by_side;
        intent_by_side[patch.side.index()] = patch.intent;
        contact_count_by_side[patch.side.index()] = patch.contact_count;
        StatusSnapshot {
            revision: self.revision + 1,
            intent_by_side,
            contact_count_by_side,
            layer: patch.layer,
            typing_enabled: patch.typing_enabled,
            keyboard_mode: patch.keyboard_mode,
            diagnostics: patch.diagnostics,
        }
    }
}
