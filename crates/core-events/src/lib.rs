//! Frame/contact value types, dispatch events, and the telemetry counters
//! shared by the rest of the touch pipeline.
//!
//! Everything in this crate is plain data: `Contact` and `Frame` are fixed
//! size so the capture → engine → dispatch hot path never allocates (§5 of
//! the design). `DispatchEvent` is the only thing that crosses the boundary
//! into the external sink; its payload is a platform-neutral `SemanticAction`
//! so the sink — not the core — owns the mapping to scancodes.

use std::sync::atomic::AtomicU64;

pub mod contact;
pub mod dispatch;

pub use contact::{Contact, ContactFlags, Frame, Side, MAX_CONTACTS};
pub use dispatch::{
    Corner, DispatchEvent, DispatchFlags, DispatchKind, KeyAction, LayerChangeKind, ModifierKey,
    MouseButton, NavigationKey, SemanticAction,
};

/// Capacity of the Engine Actor's inbox (§4.7). Sized generously above one
/// frame interval of burst so that capture threads rarely hit the
/// newest-wins replacement policy under normal load.
pub const ENGINE_INBOX_CAP: usize = 512;

/// Capacity of the bounded dispatch ring (§4.8). Spec requires "capacity ≥ 256".
pub const DISPATCH_RING_CAP: usize = 512;

/// Minimum rate (Hz) the dispatch pump calls `sink.tick` to drive repeat/hold
/// timers, per §4.8.
pub const DISPATCH_TICK_HZ: u64 = 100;

/// Diagnostic counters. Relaxed ordering throughout: these are monotonic
/// tallies inspected by `StatusSnapshot`, never used for synchronization.
pub static CAPTURE_FRAMES: AtomicU64 = AtomicU64::new(0);
pub static CAPTURE_FRAME_OVERFLOW: AtomicU64 = AtomicU64::new(0);
pub static CAPTURE_FRAME_NON_MONOTONIC: AtomicU64 = AtomicU64::new(0);
pub static ENGINE_FRAMES: AtomicU64 = AtomicU64::new(0);
pub static INBOX_INGEST_REPLACED: AtomicU64 = AtomicU64::new(0);
pub static DISPATCH_DROPPED: AtomicU64 = AtomicU64::new(0);
pub static RELEASE_DROPPED_HOLD_CONSUMED: AtomicU64 = AtomicU64::new(0);
pub static RELEASE_DROPPED_DRAG_CANCEL: AtomicU64 = AtomicU64::new(0);
pub static RELEASE_DROPPED_OFF_KEY_NO_SNAP: AtomicU64 = AtomicU64::new(0);
pub static RELEASE_DROPPED_TAP_GESTURE_ACTIVE: AtomicU64 = AtomicU64::new(0);

/// One of the four named `ReleaseDropped` reasons from §4.5/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseDroppedReason {
    HoldConsumed,
    DragCancel,
    OffKeyNoSnap,
    TapGestureActive,
}

impl ReleaseDroppedReason {
    pub fn counter(self) -> &'static AtomicU64 {
        match self {
            ReleaseDroppedReason::HoldConsumed => &RELEASE_DROPPED_HOLD_CONSUMED,
            ReleaseDroppedReason::DragCancel => &RELEASE_DROPPED_DRAG_CANCEL,
            ReleaseDroppedReason::OffKeyNoSnap => &RELEASE_DROPPED_OFF_KEY_NO_SNAP,
            ReleaseDroppedReason::TapGestureActive => &RELEASE_DROPPED_TAP_GESTURE_ACTIVE,
        }
    }

    pub fn record(self) {
        self.counter()
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseDroppedReason::HoldConsumed => "hold_consumed",
            ReleaseDroppedReason::DragCancel => "drag_cancel",
            ReleaseDroppedReason::OffKeyNoSnap => "off_key_no_snap",
            ReleaseDroppedReason::TapGestureActive => "tap_gesture_active",
        }
    }
}
