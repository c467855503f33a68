//! Engine thread (§5): the sole writer of `EngineCore`, fed by a bounded
//! `EngineInbox`, publishing snapshots and posting dispatch events as its
//! only outputs. Mirrors `core-dispatch::spawn_pump`'s dedicated-OS-thread
//! shape, since both are single-consumer loops with a shutdown-drain
//! obligation rather than async tasks cooperating on a shared runtime.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use core_config::TouchProcessorConfig;
use core_dispatch::DispatchRing;
use core_events::{Frame, Side};
use core_keymap::{KeyLayout, Keymap};
use core_snapshot::SnapshotPublisher;

use crate::engine_core::EngineCore;
use crate::inbox::{EngineInbox, EngineMessage};

/// Shutdown must drain whatever is already queued before exiting, but not
/// indefinitely (§5: "shutdown drain budget ~50ms").
const SHUTDOWN_DRAIN_BUDGET: Duration = Duration::from_millis(50);

/// Producer-side handle: cheap to clone, safe to share across capture
/// threads and configuration/UI callers. Every call is a non-blocking push
/// onto the inbox; the actor thread is the only consumer.
#[derive(Clone)]
pub struct EngineHandle {
    inbox: Arc<EngineInbox>,
}

impl EngineHandle {
    pub fn ingest(&self, side: Side, frame: Frame) {
        self.inbox.push(EngineMessage::Ingest { side, frame });
    }

    pub fn apply_config(&self, config: TouchProcessorConfig) {
        self.inbox.push(EngineMessage::ApplyConfig(config));
    }

    pub fn apply_keymap(&self, keymap: Keymap) {
        self.inbox.push(EngineMessage::ApplyKeymap(keymap));
    }

    pub fn apply_layouts(&self, left: KeyLayout, right: KeyLayout) {
        self.inbox.push(EngineMessage::ApplyLayouts { left, right });
    }

    pub fn set_layer(&self, layer: u8) {
        self.inbox.push(EngineMessage::SetLayer(layer));
    }

    pub fn set_typing_enabled(&self, enabled: bool) {
        self.inbox.push(EngineMessage::SetTypingEnabled(enabled));
    }

    pub fn set_keyboard_mode(&self, enabled: bool) {
        self.inbox.push(EngineMessage::SetKeyboardMode(enabled));
    }

    /// Current inbox depth, sampled for diagnostics; not authoritative by
    /// the time the caller reads it.
    pub fn inbox_depth(&self) -> usize {
        self.inbox.len()
    }

    fn shutdown(&self) {
        self.inbox.push(EngineMessage::Shutdown);
    }
}

/// The running actor thread plus the handle used to reach it.
pub struct Engine {
    thread: Option<JoinHandle<()>>,
    handle: EngineHandle,
}

impl Engine {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Signal shutdown and block until the thread has drained its inbox (up
    /// to the drain budget) and exited.
    pub fn shutdown(mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_engine(
    keymap: Keymap,
    left: KeyLayout,
    right: KeyLayout,
    config: TouchProcessorConfig,
    preset: impl Into<String>,
    typing_enabled_default: bool,
    snapshots: Arc<SnapshotPublisher>,
    dispatch: Arc<DispatchRing>,
) -> Engine {
    let inbox = Arc::new(EngineInbox::new(core_events::ENGINE_INBOX_CAP));
    let thread_inbox = inbox.clone();
    let preset = preset.into();

    let thread = thread::spawn(move || {
        let mut core = EngineCore::new(keymap, &left, &right, config, preset, typing_enabled_default);
        let mut left = left;
        let mut right = right;

        loop {
            let message = thread_inbox.pop_blocking();
            if !apply(&mut core, &mut left, &mut right, &snapshots, &dispatch, message) {
                break;
            }
        }

        let deadline = Instant::now() + SHUTDOWN_DRAIN_BUDGET;
        while Instant::now() < deadline {
            match thread_inbox.try_pop() {
                Some(message) => {
                    apply(&mut core, &mut left, &mut right, &snapshots, &dispatch, message);
                }
                None => break,
            }
        }
        tracing::debug!(target: "core_engine", "engine thread drained and exiting");
    });

    Engine {
        thread: Some(thread),
        handle: EngineHandle { inbox },
    }
}

/// Apply one message to `core`, publishing snapshots and posting dispatch
/// events for an `Ingest`. Returns `false` on `Shutdown` to stop the loop.
fn apply(
    core: &mut EngineCore,
    left: &mut KeyLayout,
    right: &mut KeyLayout,
    snapshots: &Arc<SnapshotPublisher>,
    dispatch: &Arc<DispatchRing>,
    message: EngineMessage,
) -> bool {
    match message {
        EngineMessage::Ingest { side, frame } => {
            let depth = dispatch.len();
            let out = core.ingest(side, &frame, depth);
            for event in out.dispatch {
                dispatch.push(event);
            }
            snapshots.publish_render(out.render_patch);
            snapshots.publish_status(out.status_patch);
        }
        EngineMessage::ApplyConfig(config) => core.apply_config(config),
        EngineMessage::ApplyKeymap(keymap) => core.apply_keymap(keymap),
        EngineMessage::ApplyLayouts { left: new_left, right: new_right } => {
            *left = new_left;
            *right = new_right;
            core.apply_layouts(left, right);
        }
        EngineMessage::SetLayer(layer) => core.set_layer(layer),
        EngineMessage::SetTypingEnabled(enabled) => core.set_typing_enabled(enabled),
        EngineMessage::SetKeyboardMode(enabled) => core.set_keyboard_mode(enabled),
        EngineMessage::Shutdown => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_dispatch::DispatchRing;
    use core_events::{Contact, ContactFlags};
    use core_keymap::{ColumnSettings, LayoutPreset, build_layouts};

    fn fixture() -> (KeyLayout, KeyLayout) {
        let preset = LayoutPreset::grid_6x3();
        let columns = ColumnSettings::uniform(preset.cols);
        build_layouts(&preset, &columns)
    }

    #[test]
    fn ingest_flows_through_to_a_published_render_snapshot() {
        let (left, right) = fixture();
        let snapshots = Arc::new(SnapshotPublisher::new());
        let dispatch = Arc::new(DispatchRing::new(16));
        let engine = spawn_engine(
            Keymap::empty(),
            left,
            right,
            TouchProcessorConfig::default(),
            "6x3",
            true,
            snapshots.clone(),
            dispatch,
        );
        let handle = engine.handle();

        let mut frame = Frame::new(0, 0, 0, 1000, 1000);
        frame.push_contact(Contact::new(1, 20, 20, ContactFlags::TIP | ContactFlags::CONFIDENCE));
        handle.ingest(Side::Left, frame);

        let deadline = Instant::now() + Duration::from_secs(1);
        while snapshots.read_render().revision == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(snapshots.read_render().revision, 1);
        engine.shutdown();
    }

    #[test]
    fn shutdown_drains_a_trailing_config_change_before_exiting() {
        let (left, right) = fixture();
        let snapshots = Arc::new(SnapshotPublisher::new());
        let dispatch = Arc::new(DispatchRing::new(16));
        let engine = spawn_engine(
            Keymap::empty(),
            left,
            right,
            TouchProcessorConfig::default(),
            "6x3",
            true,
            snapshots,
            dispatch,
        );
        let handle = engine.handle();
        handle.set_layer(2);
        engine.shutdown();
    }
}
