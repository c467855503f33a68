//! `g2k-replay`: offline replay harness CLI (§6 exemplar). Loads a capture
//! fixture, drives it through the touch-processing pipeline, and either
//! writes the resulting transcript or compares it byte-for-byte against an
//! expected one.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use core_keymap::{ColumnSettings, Keymap, LayoutPreset, build_layouts};

/// CLI arguments (§6 "Replay harness CLI").
#[derive(Parser, Debug)]
#[command(name = "g2k-replay", version, about = "GlassToKey deterministic replay harness")]
struct Args {
    /// Capture fixture to replay (`ATPCAP01`, §4.10).
    #[arg(long)]
    fixture: PathBuf,
    /// Write the produced transcript here.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Compare the produced transcript against this file and exit 2 on mismatch.
    #[arg(long = "expected-transcript")]
    expected_transcript: Option<PathBuf>,
    /// Optional keymap JSON file (§4.2); defaults to an empty keymap.
    #[arg(long)]
    keymap: Option<PathBuf>,
    /// Layout preset name: `6x3` or `6x4` (§4.2).
    #[arg(long, default_value = "6x3")]
    preset: String,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "g2k-replay.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn preset_for(name: &str) -> LayoutPreset {
    match name {
        "6x4" => LayoutPreset::grid_6x4(),
        _ => LayoutPreset::grid_6x3(),
    }
}

fn load_keymap(path: Option<&Path>) -> Result<Keymap> {
    let Some(path) = path else {
        return Ok(Keymap::empty());
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading keymap {}", path.display()))?;
    Keymap::load(&bytes).map_err(|err| anyhow::anyhow!("malformed keymap {}: {err}", path.display()))
}

fn run(args: &Args) -> Result<i32> {
    let keymap = load_keymap(args.keymap.as_deref())?;
    let preset = preset_for(&args.preset);
    let columns = ColumnSettings::uniform(preset.cols);
    let (left, right) = build_layouts(&preset, &columns);

    info!(target: "g2k_replay", fixture = %args.fixture.display(), "starting replay");

    let transcript = core_replay::replay_fixture(
        &args.fixture,
        keymap,
        &left,
        &right,
        core_config::TouchProcessorConfig::default(),
        preset.name.clone(),
        true,
    )?;

    let lines = transcript.to_lines().context("serializing transcript")?;

    if let Some(output) = &args.output {
        std::fs::write(output, &lines).with_context(|| format!("writing transcript {}", output.display()))?;
    }

    if let Some(expected_path) = &args.expected_transcript {
        let expected = std::fs::read_to_string(expected_path)
            .with_context(|| format!("reading expected transcript {}", expected_path.display()))?;
        if expected != lines {
            error!(target: "g2k_replay", "transcript mismatch against expected");
            return Ok(2);
        }
    }

    info!(target: "g2k_replay", records = transcript.records.len(), "replay complete");
    Ok(0)
}

fn main() -> std::process::ExitCode {
    let _guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            error!(target: "g2k_replay", ?err, "replay failed");
            std::process::ExitCode::from(1)
        }
    }
}
