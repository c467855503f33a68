//! Touch Table (C4) and Intent State Machine (C5).
//!
//! This crate owns the per-frame mutable bookkeeping the Touch Processor
//! Core (`core-actions`) drives: a fixed-capacity contact table plus the
//! per-side classification FSM, the layer stack, and cross-side swipe
//! aggregation. It holds no binding/keymap resolution logic itself —
//! `BindingHit` values are opaque identifiers here, resolved into
//! `KeyAction`s by the caller.

pub mod intent;
pub mod table;

pub use intent::{IntentEvent, IntentMode, LayerStack, SideState, SwipeAggregator};
pub use table::{TouchKey, TouchTable, TouchTableEntry};

use core_events::Side;

/// The full cross-frame state owned by the Engine Actor: one `TouchTable`
/// shared by both sides, one `SideState` per side, the layer stack, the
/// swipe aggregator, and the global typing-enabled bit (§3 IntentMode,
/// §4.5 "the Core flips a bit that gates subsequent keying").
#[derive(Debug)]
pub struct CoreState {
    pub table: TouchTable,
    pub sides: [SideState; 2],
    pub layers: LayerStack,
    pub swipe: SwipeAggregator,
    pub typing_enabled: bool,
    /// Independent UI-facing toggle (§9: "the core exposes a keyboard mode
    /// flag... the sink chooses how to suppress background clicks"). Set
    /// only by an explicit `SetKeyboardMode` request, never derived from
    /// `typing_enabled`.
    pub keyboard_mode: bool,
}

impl CoreState {
    pub fn new(typing_enabled_default: bool) -> Self {
        Self {
            table: TouchTable::new(),
            sides: [SideState::new(), SideState::new()],
            layers: LayerStack::default(),
            swipe: SwipeAggregator::default(),
            typing_enabled: typing_enabled_default,
            keyboard_mode: false,
        }
    }

    pub fn side_state(&mut self, side: Side) -> &mut SideState {
        &mut self.sides[side.index()]
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_idle_on_both_sides() {
        let state = CoreState::default();
        assert_eq!(state.sides[0].mode, IntentMode::Idle);
        assert_eq!(state.sides[1].mode, IntentMode::Idle);
        assert!(state.typing_enabled);
    }
}
