//! Resolves `IntentEvent`s against the active keymap into `DispatchEvent`s
//! (§4.6 step 4), applying the layer/typing-toggle side effects a resolved
//! action carries directly onto `CoreState`.

use core_events::{
    Contact, DispatchEvent, DispatchKind, KeyAction, LayerChangeKind, MouseButton, SemanticAction,
    Side,
};
use core_keymap::{BindingHit, Keymap, KeyMapping, StorageKey};
use core_state::{CoreState, IntentEvent};

enum Phase {
    Tap,
    Down,
    Up,
}

fn resolve_mapping(keymap: &Keymap, preset: &str, layer: u8, side: Side, hit: &BindingHit) -> KeyMapping {
    match hit {
        BindingHit::Grid { row, col } => {
            let key = StorageKey::encode(side, *row, *col);
            keymap.resolve(preset, layer, &key, "?")
        }
        BindingHit::Custom(id) => keymap
            .custom_buttons(preset, layer)
            .iter()
            .find(|b| &b.id == id)
            .map(|b| KeyMapping {
                primary: b.primary.clone(),
                hold: b.hold.clone(),
            })
            .unwrap_or_else(|| KeyMapping {
                primary: KeyAction::new("?", SemanticAction::NoOp),
                hold: None,
            }),
    }
}

/// Effective action for a binding hit: hold-if-defined-else-primary when
/// `use_hold` is set (a `KeyDown`/`KeyUp` pair both resolve the same way so
/// they carry matching semantics), else always primary (`KeyTap`).
fn resolve_action(
    keymap: &Keymap,
    preset: &str,
    layer: u8,
    side: Side,
    hit: &BindingHit,
    use_hold: bool,
) -> SemanticAction {
    let mapping = resolve_mapping(keymap, preset, layer, side, hit);
    if use_hold {
        mapping.hold.unwrap_or(mapping.primary).semantic
    } else {
        mapping.primary.semantic
    }
}

fn contact_has_force(contacts: &[Contact], contact_id: u32) -> bool {
    contacts
        .iter()
        .find(|c| c.id == contact_id)
        .map(|c| c.has_force)
        .unwrap_or(false)
}

/// `true` when `semantic` is force-sensitive and the originating contact did
/// not report force data this frame (§4.5: "on non-force inputs these
/// semantics are disabled").
fn force_disabled(semantic: &SemanticAction, has_force: bool) -> bool {
    matches!(
        semantic,
        SemanticAction::ForceClick(_) | SemanticAction::CornerForce(_)
    ) && !has_force
}

fn emit_for_semantic(
    semantic: SemanticAction,
    phase: Phase,
    has_force: bool,
    repeat_token: Option<u64>,
    now_ticks: i64,
) -> Option<DispatchEvent> {
    if force_disabled(&semantic, has_force) {
        return None;
    }
    let kind = match phase {
        Phase::Tap => match semantic {
            SemanticAction::MouseButton(b) => DispatchKind::MouseClick(b),
            other => DispatchKind::KeyTap(other),
        },
        Phase::Down => match semantic {
            SemanticAction::Modifier(m) => DispatchKind::ModifierDown(m),
            SemanticAction::MouseButton(b) => DispatchKind::MouseDown(b),
            other => DispatchKind::KeyDown(other),
        },
        Phase::Up => match semantic {
            SemanticAction::Modifier(m) => DispatchKind::ModifierUp(m),
            SemanticAction::MouseButton(b) => DispatchKind::MouseUp(b),
            other => DispatchKind::KeyUp(other),
        },
    };
    let mut event = DispatchEvent::new(kind, now_ticks);
    if let Some(token) = repeat_token {
        event = event.with_repeat_token(token);
    }
    Some(event)
}

/// Translate one `IntentEvent` into a `DispatchEvent`, applying any layer or
/// typing-toggle side effect the resolved action carries onto `state` along
/// the way. Returns `None` for events that are purely internal bookkeeping
/// (gesture/mouse-candidate transitions) or that the force-click gate
/// suppressed.
pub fn translate(
    state: &mut CoreState,
    keymap: &Keymap,
    preset: &str,
    side: Side,
    contacts: &[Contact],
    event: IntentEvent,
    now_ticks: i64,
) -> Option<DispatchEvent> {
    let layer = state.layers.active_layer();
    match event {
        IntentEvent::KeyTap { contact_id, key } => {
            let semantic = resolve_action(keymap, preset, layer, side, &key, false);
            match semantic {
                SemanticAction::LayerToggle(n) => {
                    state.layers.toggle_persistent(n);
                    Some(DispatchEvent::new(
                        DispatchKind::LayerChange { layer: n, kind: LayerChangeKind::Toggle },
                        now_ticks,
                    ))
                }
                SemanticAction::LayerSet(n) => {
                    state.layers.set_persistent(n);
                    Some(DispatchEvent::new(
                        DispatchKind::LayerChange { layer: n, kind: LayerChangeKind::Set },
                        now_ticks,
                    ))
                }
                SemanticAction::TypingToggle => {
                    state.typing_enabled = !state.typing_enabled;
                    Some(DispatchEvent::new(DispatchKind::TypingToggle(state.typing_enabled), now_ticks))
                }
                other => emit_for_semantic(other, Phase::Tap, contact_has_force(contacts, contact_id), None, now_ticks),
            }
        }
        IntentEvent::KeyDown { contact_id, key, repeat_token, use_hold_action } => {
            let semantic = resolve_action(keymap, preset, layer, side, &key, use_hold_action);
            match semantic {
                SemanticAction::LayerMomentary(n) => {
                    state.layers.push_momentary(side, contact_id, n);
                    Some(DispatchEvent::new(
                        DispatchKind::LayerChange { layer: n, kind: LayerChangeKind::MomentaryEnter },
                        now_ticks,
                    ))
                }
                other => emit_for_semantic(
                    other,
                    Phase::Down,
                    contact_has_force(contacts, contact_id),
                    Some(repeat_token),
                    now_ticks,
                ),
            }
        }
        IntentEvent::KeyUp { contact_id, key, repeat_token } => {
            let semantic = resolve_action(keymap, preset, layer, side, &key, true);
            match semantic {
                SemanticAction::LayerMomentary(n) => {
                    state.layers.release_momentary(side, contact_id);
                    Some(DispatchEvent::new(
                        DispatchKind::LayerChange { layer: n, kind: LayerChangeKind::MomentaryExit },
                        now_ticks,
                    ))
                }
                other => emit_for_semantic(
                    other,
                    Phase::Up,
                    contact_has_force(contacts, contact_id),
                    Some(repeat_token),
                    now_ticks,
                ),
            }
        }
        IntentEvent::ReleaseDropped { reason, .. } => {
            reason.record();
            None
        }
        IntentEvent::MouseButtonDown => {
            Some(DispatchEvent::new(DispatchKind::MouseDown(MouseButton::Left), now_ticks))
        }
        IntentEvent::MouseButtonUp => {
            Some(DispatchEvent::new(DispatchKind::MouseUp(MouseButton::Left), now_ticks))
        }
        IntentEvent::GestureEntered
        | IntentEvent::GestureExited
        | IntentEvent::MouseCandidateEntered
        | IntentEvent::MouseConfirmed
        | IntentEvent::MouseExited => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::ContactFlags;

    fn contact(id: u32, has_force: bool) -> Contact {
        let mut c = Contact::new(id, 0, 0, ContactFlags::TIP);
        c.has_force = has_force;
        c
    }

    #[test]
    fn key_tap_resolves_to_key_tap_dispatch() {
        let mut state = CoreState::default();
        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("A", SemanticAction::Letter('a')),
                hold: None,
            },
        );

        let event = IntentEvent::KeyTap { contact_id: 1, key: BindingHit::Grid { row: 0, col: 0 } };
        let contacts = [contact(1, false)];
        let dispatch = translate(&mut state, &keymap, "6x3", Side::Right, &contacts, event, 0).unwrap();
        assert_eq!(dispatch.kind, DispatchKind::KeyTap(SemanticAction::Letter('a')));
    }

    #[test]
    fn force_click_action_is_suppressed_without_force_data() {
        let mut state = CoreState::default();
        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("FC", SemanticAction::ForceClick(1)),
                hold: None,
            },
        );

        let event = IntentEvent::KeyTap { contact_id: 1, key: BindingHit::Grid { row: 0, col: 0 } };
        let contacts = [contact(1, false)];
        let dispatch = translate(&mut state, &keymap, "6x3", Side::Right, &contacts, event, 0);
        assert!(dispatch.is_none());
    }

    #[test]
    fn force_click_action_fires_with_force_data() {
        let mut state = CoreState::default();
        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("FC", SemanticAction::ForceClick(1)),
                hold: None,
            },
        );

        let event = IntentEvent::KeyTap { contact_id: 1, key: BindingHit::Grid { row: 0, col: 0 } };
        let contacts = [contact(1, true)];
        let dispatch = translate(&mut state, &keymap, "6x3", Side::Right, &contacts, event, 0);
        assert!(dispatch.is_some());
    }

    #[test]
    fn layer_toggle_tap_flips_persistent_layer() {
        let mut state = CoreState::default();
        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("L1", SemanticAction::LayerToggle(1)),
                hold: None,
            },
        );

        let event = IntentEvent::KeyTap { contact_id: 1, key: BindingHit::Grid { row: 0, col: 0 } };
        let contacts = [contact(1, false)];
        translate(&mut state, &keymap, "6x3", Side::Right, &contacts, event, 0);
        assert_eq!(state.layers.active_layer(), 1);
    }

    #[test]
    fn typing_toggle_tap_flips_typing_enabled() {
        let mut state = CoreState::default();
        let mut keymap = Keymap::empty();
        keymap.layout_block_mut("6x3").mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("TT", SemanticAction::TypingToggle),
                hold: None,
            },
        );
        assert!(state.typing_enabled);

        let event = IntentEvent::KeyTap { contact_id: 1, key: BindingHit::Grid { row: 0, col: 0 } };
        let contacts = [contact(1, false)];
        translate(&mut state, &keymap, "6x3", Side::Right, &contacts, event, 0);
        assert!(!state.typing_enabled);
    }
}
