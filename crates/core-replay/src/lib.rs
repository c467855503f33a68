//! Replay harness (C11, §6): drives a capture fixture through the same
//! frame-gating and engine logic production input uses, producing a
//! deterministic transcript two independent runs over the same fixture must
//! agree on byte-for-byte.

mod convert;
mod harness;
mod transcript;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use core_codec::CaptureReader;
use core_config::TouchProcessorConfig;
use core_keymap::{KeyLayout, Keymap};

pub use convert::{side_from_hint, to_frame};
pub use harness::{FixtureHarness, ReplayHarness};
pub use transcript::{Transcript, TranscriptDiagnostics, TranscriptRecord};

/// Open `fixture_path`, replay every frame through a fresh `FixtureHarness`,
/// and return the resulting transcript.
pub fn replay_fixture(
    fixture_path: impl AsRef<Path>,
    keymap: Keymap,
    left: &KeyLayout,
    right: &KeyLayout,
    config: TouchProcessorConfig,
    preset: impl Into<String>,
    typing_enabled_default: bool,
) -> anyhow::Result<Transcript> {
    let fixture_path = fixture_path.as_ref();
    let file = File::open(fixture_path)
        .with_context(|| format!("opening replay fixture {}", fixture_path.display()))?;
    let reader = CaptureReader::open(BufReader::new(file))
        .with_context(|| format!("reading replay fixture header {}", fixture_path.display()))?;

    let harness = FixtureHarness::new(keymap, left, right, config, preset, typing_enabled_default);
    let transcript = harness
        .run(reader)
        .with_context(|| format!("replaying fixture {}", fixture_path.display()))?;
    Ok(transcript)
}
