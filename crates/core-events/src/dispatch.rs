//! Dispatch events and the platform-neutral `SemanticAction` payload they
//! carry (§3, §4.8, §9 "cross-platform virtual-key encoding"). The sink, not
//! the core, maps a `SemanticAction` to a scancode.

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Platform-neutral payload attached to a `KeyAction`. Force-click variants
/// are no-ops when the originating frame's contacts carry `has_force=false`
/// (§9 "force-click dependent paths when force data is absent").
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticAction {
    Letter(char),
    Digit(char),
    Modifier(ModifierKey),
    Navigation(NavigationKey),
    Function(u8),
    Brightness(i8),
    MouseButton(MouseButton),
    Chord(Vec<SemanticAction>),
    LayerToggle(u8),
    LayerSet(u8),
    LayerMomentary(u8),
    TypingToggle,
    HapticTrigger(u8),
    ForceClick(u8),
    CornerForce(Corner),
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Option,
    Command,
    Fn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
}

/// A single mapping slot's effective action (§3 `KeyAction`).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyAction {
    pub label: String,
    pub semantic: SemanticAction,
}

impl KeyAction {
    pub fn new(label: impl Into<String>, semantic: SemanticAction) -> Self {
        Self {
            label: label.into(),
            semantic,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DispatchFlags: u8 {
        const REPEATABLE = 0b01;
        const HAPTIC = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerChangeKind {
    Toggle,
    Set,
    MomentaryEnter,
    MomentaryExit,
}

/// A single semantic output command posted to the external sink (§4.8).
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchKind {
    KeyTap(SemanticAction),
    KeyDown(SemanticAction),
    KeyUp(SemanticAction),
    ModifierDown(ModifierKey),
    ModifierUp(ModifierKey),
    MouseClick(MouseButton),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    HapticPulse(u8),
    TypingToggle(bool),
    LayerChange { layer: u8, kind: LayerChangeKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEvent {
    pub kind: DispatchKind,
    pub timestamp_ticks: i64,
    pub repeat_token: Option<u64>,
    pub flags: DispatchFlags,
}

impl DispatchEvent {
    pub fn new(kind: DispatchKind, timestamp_ticks: i64) -> Self {
        let flags = match &kind {
            DispatchKind::KeyDown(_) => DispatchFlags::REPEATABLE,
            _ => DispatchFlags::empty(),
        };
        Self {
            kind,
            timestamp_ticks,
            repeat_token: None,
            flags,
        }
    }

    pub fn with_repeat_token(mut self, token: u64) -> Self {
        self.repeat_token = Some(token);
        self
    }

    pub fn with_haptic(mut self) -> Self {
        self.flags |= DispatchFlags::HAPTIC;
        self
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self.kind,
            DispatchKind::ModifierDown(_) | DispatchKind::ModifierUp(_)
        )
    }

    pub fn is_repeatable(&self) -> bool {
        self.flags.contains(DispatchFlags::REPEATABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_is_repeatable_by_default() {
        let ev = DispatchEvent::new(DispatchKind::KeyDown(SemanticAction::Letter('a')), 10);
        assert!(ev.is_repeatable());
        assert!(!ev.is_modifier());
    }

    #[test]
    fn modifier_events_are_flagged() {
        let ev = DispatchEvent::new(DispatchKind::ModifierDown(ModifierKey::Shift), 0);
        assert!(ev.is_modifier());
    }
}
