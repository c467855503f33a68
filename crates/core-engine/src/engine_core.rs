//! `EngineCore`: the single-writer state a frame-by-frame session accumulates
//! (§4.7). Holds no thread, channel, or clock of its own — `ingest` takes
//! `now_ticks` from the caller so both the live actor thread (`actor.rs`) and
//! a synchronous replay driver can share this exact state machine and get
//! byte-identical behavior from identical inputs.

use core_config::TouchProcessorConfig;
use core_events::{Frame, Side};
use core_keymap::{BindingIndex, KeyLayout, Keymap};
use core_state::CoreState;

/// Everything needed to resolve one side's touch frames into dispatch
/// events and snapshot patches: the mutable `CoreState`, the active
/// `Keymap`/`BindingIndex`/preset, and the tuning `TouchProcessorConfig`.
/// Swapped atomically by `apply_*` — never partially, since a config or
/// keymap swap only ever happens between two `ingest` calls (§8 invariant 7).
pub struct EngineCore {
    state: CoreState,
    keymap: Keymap,
    index: BindingIndex,
    config: TouchProcessorConfig,
    preset: String,
    frame_seq: u64,
}

impl EngineCore {
    pub fn new(
        keymap: Keymap,
        left: &KeyLayout,
        right: &KeyLayout,
        config: TouchProcessorConfig,
        preset: impl Into<String>,
        typing_enabled_default: bool,
    ) -> Self {
        Self {
            state: CoreState::new(typing_enabled_default),
            keymap,
            index: BindingIndex::new(left, right),
            config,
            preset: preset.into(),
            frame_seq: 0,
        }
    }

    /// Advance by one frame on `side`, returning the dispatch events and
    /// snapshot patches this frame produced. `dispatch_depth` is the
    /// caller-sampled outbound queue depth folded into the status patch.
    pub fn ingest(&mut self, side: Side, frame: &Frame, dispatch_depth: usize) -> core_actions::ProcessOutput {
        self.frame_seq += 1;
        core_events::ENGINE_FRAMES.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        core_actions::process(
            &mut self.state,
            &self.keymap,
            &self.index,
            &self.config,
            &self.preset,
            side,
            frame,
            frame.arrival_ticks,
            self.frame_seq,
            dispatch_depth,
        )
    }

    pub fn apply_config(&mut self, config: TouchProcessorConfig) {
        tracing::debug!(target: "core_engine", "applying updated touch processor config");
        self.config = config;
    }

    pub fn apply_keymap(&mut self, keymap: Keymap) {
        tracing::debug!(target: "core_engine", version = keymap.version, "applying updated keymap");
        self.keymap = keymap;
    }

    pub fn apply_layouts(&mut self, left: &KeyLayout, right: &KeyLayout) {
        tracing::debug!(target: "core_engine", "rebuilding binding index from updated layouts");
        self.index = BindingIndex::new(left, right);
    }

    pub fn set_layer(&mut self, layer: u8) {
        self.state.layers.set_persistent(layer);
    }

    pub fn set_typing_enabled(&mut self, enabled: bool) {
        self.state.typing_enabled = enabled;
    }

    pub fn set_keyboard_mode(&mut self, enabled: bool) {
        self.state.keyboard_mode = enabled;
    }

    pub fn frame_seq(&self) -> u64 {
        self.frame_seq
    }
}
