//! Per-side monotonic arrival-tick gate (§3, §8 invariant 3 "non-monotonic
//! arrival_ticks on a side are dropped and counted").

use core_events::{CAPTURE_FRAME_NON_MONOTONIC, CAPTURE_FRAMES, Frame, Side};
use std::sync::atomic::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NonMonotonicTicks { previous: i64, got: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Dropped(DropReason),
}

/// Tracks the last accepted `arrival_ticks` per side so a capture
/// collaborator's out-of-order reports never reach the engine.
#[derive(Debug, Default)]
pub struct FrameGate {
    last_ticks: [Option<i64>; 2],
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live-capture policy (§4.1): a capture collaborator is trusted to
    /// keep going after an out-of-order report, so every frame is
    /// forwarded; a regressive `arrival_ticks` only trips the diagnostic
    /// counter.
    pub fn observe(&mut self, side: Side, frame: &Frame) {
        let slot = &mut self.last_ticks[side.index()];
        match *slot {
            Some(last) if frame.arrival_ticks <= last => {
                CAPTURE_FRAME_NON_MONOTONIC.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    target: "core_input",
                    ?side,
                    last,
                    got = frame.arrival_ticks,
                    "non-monotonic frame forwarded under capture policy"
                );
            }
            _ => *slot = Some(frame.arrival_ticks),
        }
        CAPTURE_FRAMES.fetch_add(1, Ordering::Relaxed);
    }

    /// Replay policy (§4.1): a regressive `arrival_ticks` makes the
    /// fixture invalid, so the frame is rejected rather than forwarded.
    pub fn submit(&mut self, side: Side, frame: &Frame) -> SubmitOutcome {
        let slot = &mut self.last_ticks[side.index()];
        if let Some(last) = *slot {
            if frame.arrival_ticks <= last {
                CAPTURE_FRAME_NON_MONOTONIC.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    target: "core_input",
                    ?side,
                    last,
                    got = frame.arrival_ticks,
                    "rejecting non-monotonic frame"
                );
                return SubmitOutcome::Dropped(DropReason::NonMonotonicTicks {
                    previous: last,
                    got: frame.arrival_ticks,
                });
            }
        }
        *slot = Some(frame.arrival_ticks);
        CAPTURE_FRAMES.fetch_add(1, Ordering::Relaxed);
        SubmitOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(ticks: i64) -> Frame {
        Frame::new(ticks, 0, 0, 100, 100)
    }

    #[test]
    fn accepts_strictly_increasing_ticks() {
        let mut gate = FrameGate::new();
        assert_eq!(gate.submit(Side::Left, &frame_at(10)), SubmitOutcome::Accepted);
        assert_eq!(gate.submit(Side::Left, &frame_at(20)), SubmitOutcome::Accepted);
    }

    #[test]
    fn drops_non_monotonic_ticks() {
        let mut gate = FrameGate::new();
        assert_eq!(gate.submit(Side::Left, &frame_at(20)), SubmitOutcome::Accepted);
        assert_eq!(
            gate.submit(Side::Left, &frame_at(10)),
            SubmitOutcome::Dropped(DropReason::NonMonotonicTicks { previous: 20, got: 10 })
        );
        assert_eq!(
            gate.submit(Side::Left, &frame_at(20)),
            SubmitOutcome::Dropped(DropReason::NonMonotonicTicks { previous: 20, got: 20 })
        );
    }

    #[test]
    fn observe_never_refuses_a_regressive_frame() {
        let mut gate = FrameGate::new();
        gate.observe(Side::Left, &frame_at(20));
        gate.observe(Side::Left, &frame_at(10));
        assert_eq!(CAPTURE_FRAME_NON_MONOTONIC.load(Ordering::Relaxed) > 0, true);
    }

    #[test]
    fn sides_are_gated_independently() {
        let mut gate = FrameGate::new();
        assert_eq!(gate.submit(Side::Left, &frame_at(50)), SubmitOutcome::Accepted);
        assert_eq!(gate.submit(Side::Right, &frame_at(5)), SubmitOutcome::Accepted);
    }
}
