//! Replay harness scaffold: a minimal trait surface so a fixture can be
//! driven through the exact same gating and engine logic production capture
//! uses, without any thread or live dispatch ring. `FixtureHarness` is the
//! only implementation for now; the trait exists so a future harness (e.g.
//! one that replays straight into a live `core-engine::Engine` for soak
//! testing) can share the same `run` call sites.

use std::io::Read;

use core_codec::CaptureReader;
use core_config::TouchProcessorConfig;
use core_engine::EngineCore;
use core_input::{DropReason, FrameGate, SubmitOutcome};
use core_keymap::{KeyLayout, Keymap};
use core_snapshot::SnapshotPublisher;

use crate::convert::{side_from_hint, to_frame};
use crate::transcript::{Transcript, TranscriptDiagnostics, TranscriptRecord};

pub trait ReplayHarness {
    /// Drive every frame record in `reader` through the pipeline, returning
    /// the accumulated transcript. Consumes `self` since a harness owns a
    /// one-shot `EngineCore`/`SnapshotPublisher` pair with no reset path.
    fn run<R: Read>(self, reader: CaptureReader<R>) -> Result<Transcript, core_codec::CodecError>;
}

/// Owns one `EngineCore`, one `FrameGate`, and one `SnapshotPublisher` for
/// the lifetime of a single fixture replay. `dispatch_depth` is hardcoded to
/// zero for every frame: replay has no live dispatch ring to sample (§4.11's
/// transcript still carries the `dispatch_dropped` counter, which is global
/// and meaningful regardless).
pub struct FixtureHarness {
    core: EngineCore,
    gate: FrameGate,
    snapshots: SnapshotPublisher,
}

impl FixtureHarness {
    pub fn new(
        keymap: Keymap,
        left: &KeyLayout,
        right: &KeyLayout,
        config: TouchProcessorConfig,
        preset: impl Into<String>,
        typing_enabled_default: bool,
    ) -> Self {
        Self {
            core: EngineCore::new(keymap, left, right, config, preset, typing_enabled_default),
            gate: FrameGate::new(),
            snapshots: SnapshotPublisher::new(),
        }
    }
}

impl ReplayHarness for FixtureHarness {
    fn run<R: Read>(mut self, mut reader: CaptureReader<R>) -> Result<Transcript, core_codec::CodecError> {
        let mut transcript = Transcript::default();

        while let Some((header, frame_record)) = reader.next_frame()? {
            let side = side_from_hint(header.side_hint);
            let frame = to_frame(&frame_record, header.arrival_ticks);

            // §4.1 replay policy: unlike live capture, a regressive frame
            // makes the fixture invalid rather than merely diagnostic.
            if let SubmitOutcome::Dropped(DropReason::NonMonotonicTicks { previous, got }) =
                self.gate.submit(side, &frame)
            {
                return Err(core_codec::CodecError::NonMonotonicArrivalTicks { previous, got });
            }

            let out = self.core.ingest(side, &frame, 0);
            let render_revision = {
                self.snapshots.publish_render(out.render_patch);
                self.snapshots.read_render().revision
            };
            let diagnostics = TranscriptDiagnostics::from(&out.status_patch.diagnostics);
            let (left_count, right_count) = match side {
                core_events::Side::Left => (frame.contacts().len(), 0),
                core_events::Side::Right => (0, frame.contacts().len()),
            };
            self.snapshots.publish_status(out.status_patch);

            transcript.records.push(TranscriptRecord {
                seq: frame_record.seq,
                device_index: header.device_index,
                contact_count: frame_record.contacts.len(),
                render_revision,
                left_contacts: left_count,
                right_contacts: right_count,
                capture_frames: core_events::CAPTURE_FRAMES.load(std::sync::atomic::Ordering::Relaxed),
                diagnostics,
            });
        }

        Ok(transcript)
    }
}
