//! Intent State Machine (C5, §4.5): per-side typing/mouse/gesture
//! classification plus the layer stack and cross-side five-finger swipe
//! aggregation that together gate keying behavior.

use core_events::{ReleaseDroppedReason, Side};
use core_config::TouchProcessorConfig;
use core_keymap::BindingHit;

use crate::table::{TouchKey, TouchTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentMode {
    Idle,
    KeyCandidate,
    Typing,
    MouseCandidate,
    Mouse,
    Gesture,
}

/// Output of one `SideState::step` call; the caller (Touch Processor Core)
/// turns these into `DispatchEvent`s by resolving `key` against the active
/// keymap.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentEvent {
    KeyTap { contact_id: u32, key: BindingHit },
    KeyDown { contact_id: u32, key: BindingHit, repeat_token: u64, use_hold_action: bool },
    KeyUp { contact_id: u32, key: BindingHit, repeat_token: u64 },
    ReleaseDropped { contact_id: u32, reason: ReleaseDroppedReason },
    GestureEntered,
    GestureExited,
    MouseCandidateEntered,
    MouseConfirmed,
    MouseExited,
    MouseButtonDown,
    MouseButtonUp,
}

/// Persistent + momentary layer stack (§3 Keymap, §4.5 "Layer behavior").
/// Momentary layers stack by entry order; the active layer is the topmost
/// momentary layer, else the persistent layer.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    persistent: u8,
    momentary: Vec<(Side, u32, u8)>,
}

impl LayerStack {
    pub fn active_layer(&self) -> u8 {
        self.momentary.last().map(|(_, _, layer)| *layer).unwrap_or(self.persistent)
    }

    pub fn set_persistent(&mut self, layer: u8) {
        self.persistent = layer.min(core_keymap::MAX_LAYER);
    }

    pub fn toggle_persistent(&mut self, layer: u8) {
        let layer = layer.min(core_keymap::MAX_LAYER);
        self.persistent = if self.persistent == layer { 0 } else { layer };
    }

    pub fn push_momentary(&mut self, side: Side, contact_id: u32, layer: u8) {
        self.momentary.push((side, contact_id, layer.min(core_keymap::MAX_LAYER)));
    }

    /// Pop the momentary entry owned by `(side, contact_id)`, if any,
    /// preserving the relative order of the rest.
    pub fn release_momentary(&mut self, side: Side, contact_id: u32) {
        self.momentary.retain(|(s, id, _)| !(*s == side && *id == contact_id));
    }
}

/// Aggregates five-finger same/either-direction swipes across both sides
/// (§4.5 typing toggle, §9 Open Question 3).
#[derive(Debug, Clone, Default)]
pub struct SwipeAggregator {
    window_start_ticks: Option<i64>,
    start_centroid: [Option<(f32, f32)>; 2],
    triggered: bool,
}

impl SwipeAggregator {
    /// Feed the current centroid of active contacts for `side` (only called
    /// when exactly `MAX_CONTACTS` tips are active on that side). Returns
    /// `true` once in the frame the toggle fires.
    pub fn observe(
        &mut self,
        side: Side,
        centroid: (f32, f32),
        now_ticks: i64,
        config: &TouchProcessorConfig,
    ) -> bool {
        if self.window_start_ticks.is_none() {
            self.window_start_ticks = Some(now_ticks);
        }
        let window_start = self.window_start_ticks.unwrap();
        if now_ticks - window_start > config.swipe_window_ms as i64 {
            self.reset();
            self.window_start_ticks = Some(now_ticks);
        }

        let slot = &mut self.start_centroid[side.index()];
        let start = *slot.get_or_insert(centroid);
        let dx = centroid.0 - start.0;
        let dy = centroid.1 - start.1;
        let distance = (dx * dx + dy * dy).sqrt();

        if self.triggered || distance < config.swipe_threshold {
            return false;
        }

        let other = self.start_centroid[side.other().index()];
        let fires = if config.swipe_requires_same_direction {
            match other {
                Some(other_start) => {
                    // "same direction" compares sign of the dominant axis of motion.
                    let other_dx = centroid.0 - other_start.0;
                    dx.signum() == other_dx.signum() && other_dx.abs() >= config.swipe_threshold
                }
                None => false,
            }
        } else {
            true
        };

        if fires {
            self.triggered = true;
        }
        fires
    }

    pub fn reset(&mut self) {
        self.window_start_ticks = None;
        self.start_centroid = [None, None];
        self.triggered = false;
    }
}

/// Per-side classification state (§4.5).
#[derive(Debug, Clone)]
pub struct SideState {
    pub mode: IntentMode,
    mouse_candidate_since: Option<i64>,
    mouse_button_down: bool,
}

impl SideState {
    pub fn new() -> Self {
        Self {
            mode: IntentMode::Idle,
            mouse_candidate_since: None,
            mouse_button_down: false,
        }
    }

    /// Advance this side's FSM for one frame. `table` has already been
    /// upserted/observed for every contact in `active_ids`; entries present
    /// in the table but absent from `active_ids` are this frame's releases.
    /// `button_clicked` is the frame's physical-click flag, forwarded to the
    /// sink as `MouseButtonDown`/`Up` only while in `Mouse` mode (§4.5:
    /// "core emits MouseDown/Up on button events; cursor motion itself is
    /// out of scope").
    pub fn step(
        &mut self,
        table: &mut TouchTable,
        side: Side,
        active_ids: &[u32],
        config: &TouchProcessorConfig,
        now_ticks: i64,
        typing_enabled: bool,
        button_clicked: bool,
    ) -> Vec<IntentEvent> {
        let mut events = Vec::new();

        let released: Vec<u32> = table
            .iter_side(side)
            .map(|e| e.contact_id)
            .filter(|id| !active_ids.contains(id))
            .collect();

        for id in &released {
            events.extend(self.release_contact(table, side, *id, config, now_ticks));
        }

        if active_ids.is_empty() {
            self.mode = IntentMode::Idle;
            self.mouse_candidate_since = None;
            if self.mouse_button_down {
                self.mouse_button_down = false;
                events.push(IntentEvent::MouseButtonUp);
            }
            return events;
        }

        if self.mode == IntentMode::Idle {
            self.mode = IntentMode::KeyCandidate;
        }

        if active_ids.len() >= 3 && self.mode != IntentMode::Gesture {
            let none_held = active_ids
                .iter()
                .filter_map(|id| table.find((side, *id)))
                .all(|e| !e.hold_fired);
            if none_held {
                self.mode = IntentMode::Gesture;
                events.push(IntentEvent::GestureEntered);
            }
        }

        match self.mode {
            IntentMode::KeyCandidate => {
                events.extend(self.step_key_candidate(table, side, active_ids, config, now_ticks, typing_enabled));
            }
            IntentMode::MouseCandidate => {
                let since = *self.mouse_candidate_since.get_or_insert(now_ticks);
                if now_ticks - since > config.mouse_confirm_ms as i64 {
                    self.mode = IntentMode::Mouse;
                    events.push(IntentEvent::MouseConfirmed);
                }
            }
            IntentMode::Mouse => {
                if button_clicked && !self.mouse_button_down {
                    self.mouse_button_down = true;
                    events.push(IntentEvent::MouseButtonDown);
                } else if !button_clicked && self.mouse_button_down {
                    self.mouse_button_down = false;
                    events.push(IntentEvent::MouseButtonUp);
                }
            }
            IntentMode::Gesture | IntentMode::Typing | IntentMode::Idle => {}
        }

        events
    }

    fn step_key_candidate(
        &mut self,
        table: &mut TouchTable,
        side: Side,
        active_ids: &[u32],
        config: &TouchProcessorConfig,
        now_ticks: i64,
        typing_enabled: bool,
    ) -> Vec<IntentEvent> {
        let mut events = Vec::new();
        for id in active_ids {
            let Some(entry) = table.find_mut((side, *id)) else {
                continue;
            };
            if entry.hold_fired {
                continue;
            }
            let age = entry.age_ticks(now_ticks);
            let motion = entry.motion_from_initial();

            if !typing_enabled && motion > config.mouse_motion_threshold {
                self.mode = IntentMode::MouseCandidate;
                self.mouse_candidate_since = Some(now_ticks);
                events.push(IntentEvent::MouseCandidateEntered);
                continue;
            }

            if age > config.hold_ms as i64 && motion <= config.drag_cancel {
                entry.hold_fired = true;
                entry.held = true;
                let key = entry.last_key.clone();
                if let Some(key) = key {
                    events.push(IntentEvent::KeyDown {
                        contact_id: *id,
                        key,
                        repeat_token: entry.repeat_token,
                        use_hold_action: true,
                    });
                }
            }
        }
        events
    }

    fn release_contact(
        &mut self,
        table: &mut TouchTable,
        side: Side,
        contact_id: u32,
        config: &TouchProcessorConfig,
        now_ticks: i64,
    ) -> Vec<IntentEvent> {
        let mut events = Vec::new();
        let Some(entry) = table.remove((side, contact_id)) else {
            return events;
        };

        if self.mode == IntentMode::Gesture {
            events.push(IntentEvent::ReleaseDropped {
                contact_id,
                reason: ReleaseDroppedReason::TapGestureActive,
            });
            if table.iter_side(side).next().is_none() {
                self.mode = IntentMode::Idle;
                events.push(IntentEvent::GestureExited);
            }
            return events;
        }

        if self.mode == IntentMode::Mouse || self.mode == IntentMode::MouseCandidate {
            if table.iter_side(side).next().is_none() {
                self.mode = IntentMode::Idle;
                self.mouse_candidate_since = None;
                if self.mouse_button_down {
                    self.mouse_button_down = false;
                    events.push(IntentEvent::MouseButtonUp);
                }
                events.push(IntentEvent::MouseExited);
            }
            return events;
        }

        if entry.hold_fired {
            if let Some(key) = entry.last_key {
                events.push(IntentEvent::KeyUp {
                    contact_id,
                    key,
                    repeat_token: entry.repeat_token,
                });
            }
            events.push(IntentEvent::ReleaseDropped {
                contact_id,
                reason: ReleaseDroppedReason::HoldConsumed,
            });
            return events;
        }

        let age = entry.age_ticks(now_ticks);
        let motion = entry.motion_from_initial();

        if motion > config.drag_cancel {
            events.push(IntentEvent::ReleaseDropped {
                contact_id,
                reason: ReleaseDroppedReason::DragCancel,
            });
            return events;
        }

        if age <= config.tap_window_ms as i64 && motion <= config.tap_motion {
            if let Some(key) = entry.initial_key {
                events.push(IntentEvent::KeyTap { contact_id, key });
            } else {
                events.push(IntentEvent::ReleaseDropped {
                    contact_id,
                    reason: ReleaseDroppedReason::OffKeyNoSnap,
                });
            }
            return events;
        }

        events.push(IntentEvent::ReleaseDropped {
            contact_id,
            reason: ReleaseDroppedReason::OffKeyNoSnap,
        });
        events
    }
}

impl Default for SideState {
    fn default() -> Self {
        Self::new()
    }
}

pub type TableKey = TouchKey;

#[cfg(test)]
mod tests {
    use super::*;
    use core_keymap::BindingHit;

    fn grid(row: u8, col: u8) -> BindingHit {
        BindingHit::Grid { row, col }
    }

    #[test]
    fn tap_within_window_emits_key_tap() {
        let mut table = TouchTable::new();
        let mut side = SideState::new();
        let config = TouchProcessorConfig::default();

        table.upsert((Side::Right, 1), 0, 0.1, 0.1);
        table.find_mut((Side::Right, 1)).unwrap().observe_key(grid(0, 0));
        let events = side.step(&mut table, Side::Right, &[1], &config, 0, true, false);
        assert!(events.is_empty());

        let events = side.step(&mut table, Side::Right, &[], &config, 50, true, false);
        assert_eq!(events, vec![IntentEvent::KeyTap { contact_id: 1, key: grid(0, 0) }]);
    }

    #[test]
    fn hold_past_threshold_emits_key_down_then_key_up_on_release() {
        let mut table = TouchTable::new();
        let mut side = SideState::new();
        let config = TouchProcessorConfig::default();

        table.upsert((Side::Right, 1), 0, 0.1, 0.1);
        table.find_mut((Side::Right, 1)).unwrap().observe_key(grid(0, 0));
        side.step(&mut table, Side::Right, &[1], &config, 0, true, false);

        table.upsert((Side::Right, 1), config.hold_ms as i64 + 10, 0.1, 0.1);
        let events = side.step(&mut table, Side::Right, &[1], &config, config.hold_ms as i64 + 10, true, false);
        let repeat_token = match events[0] {
            IntentEvent::KeyDown { contact_id: 1, repeat_token, .. } => repeat_token,
            _ => panic!("expected KeyDown"),
        };

        let events = side.step(&mut table, Side::Right, &[], &config, config.hold_ms as i64 + 100, true, false);
        assert_eq!(
            events,
            vec![
                IntentEvent::KeyUp { contact_id: 1, key: grid(0, 0), repeat_token },
                IntentEvent::ReleaseDropped {
                    contact_id: 1,
                    reason: core_events::ReleaseDroppedReason::HoldConsumed
                },
            ]
        );
    }

    #[test]
    fn drag_past_cancel_threshold_drops_tap() {
        let mut table = TouchTable::new();
        let mut side = SideState::new();
        let config = TouchProcessorConfig::default();

        table.upsert((Side::Right, 1), 0, 0.1, 0.1);
        table.find_mut((Side::Right, 1)).unwrap().observe_key(grid(0, 0));
        side.step(&mut table, Side::Right, &[1], &config, 0, true, false);

        table.upsert((Side::Right, 1), 10, 0.9, 0.9);
        let events = side.step(&mut table, Side::Right, &[], &config, 10, true, false);
        assert_eq!(
            events,
            vec![IntentEvent::ReleaseDropped {
                contact_id: 1,
                reason: core_events::ReleaseDroppedReason::DragCancel
            }]
        );
    }

    #[test]
    fn three_simultaneous_contacts_enter_gesture_mode() {
        let mut table = TouchTable::new();
        let mut side = SideState::new();
        let config = TouchProcessorConfig::default();

        table.upsert((Side::Right, 1), 0, 0.1, 0.1);
        table.upsert((Side::Right, 2), 0, 0.2, 0.1);
        table.upsert((Side::Right, 3), 0, 0.3, 0.1);
        let events = side.step(&mut table, Side::Right, &[1, 2, 3], &config, 0, true, false);
        assert!(events.contains(&IntentEvent::GestureEntered));
        assert_eq!(side.mode, IntentMode::Gesture);
    }

    #[test]
    fn mouse_mode_emits_button_down_then_up_on_click_edges() {
        let mut table = TouchTable::new();
        let mut side = SideState::new();
        side.mode = IntentMode::Mouse;
        let config = TouchProcessorConfig::default();

        table.upsert((Side::Right, 1), 0, 0.5, 0.5);
        let events = side.step(&mut table, Side::Right, &[1], &config, 0, false, true);
        assert_eq!(events, vec![IntentEvent::MouseButtonDown]);

        let events = side.step(&mut table, Side::Right, &[1], &config, 10, false, true);
        assert!(events.is_empty());

        let events = side.step(&mut table, Side::Right, &[1], &config, 20, false, false);
        assert_eq!(events, vec![IntentEvent::MouseButtonUp]);
    }

    #[test]
    fn layer_stack_momentary_overrides_persistent() {
        let mut stack = LayerStack::default();
        stack.set_persistent(1);
        assert_eq!(stack.active_layer(), 1);
        stack.push_momentary(Side::Right, 5, 3);
        assert_eq!(stack.active_layer(), 3);
        stack.release_momentary(Side::Right, 5);
        assert_eq!(stack.active_layer(), 1);
    }
}
