//! Keymap persistence and resolution (§3/§4.2/§6).
//!
//! The on-disk JSON shape is `{version, layouts: {preset -> {mappings:
//! {layer -> {storage_key -> {primary, hold?}}}, custom_buttons: {layer ->
//! [CustomButton]}}}}`. Unknown top-level fields round-trip through
//! `extra`; layer keys and storage keys are `BTreeMap`s so the encoder
//! naturally emits sorted keys without a separate sort pass.

use std::collections::BTreeMap;

use core_events::{KeyAction, SemanticAction};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layout::Key;
use core_events::Side;

pub const MAX_LAYER: u8 = 7;
pub const MIN_CUSTOM_EXTENT: f32 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("malformed keymap json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no recognized layout preset in document")]
    NoRecognizedPreset,
    #[error("layer {0} outside valid range 0..={MAX_LAYER}")]
    LayerOutOfRange(u8),
}

/// `"<side>:<row>:<col>"`, deterministic per §3.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(pub String);

impl StorageKey {
    pub fn encode(side: Side, row: u8, col: u8) -> Self {
        let side = match side {
            Side::Left => "left",
            Side::Right => "right",
        };
        StorageKey(format!("{side}:{row}:{col}"))
    }

    pub fn parse(&self) -> Option<(Side, u8, u8)> {
        let mut parts = self.0.splitn(3, ':');
        let side = match parts.next()? {
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return None,
        };
        let row: u8 = parts.next()?.parse().ok()?;
        let col: u8 = parts.next()?.parse().ok()?;
        Some((side, row, col))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyMapping {
    pub primary: KeyAction,
    pub hold: Option<KeyAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomButton {
    pub id: String,
    pub side: Side,
    pub rect: Key,
    pub primary: KeyAction,
    pub hold: Option<KeyAction>,
    pub layer: u8,
}

/// Clamp a custom-button rectangle into `[0,1]` with a `0.05` minimum extent
/// per axis (§4.2). Width/height are clamped first, then position is
/// clamped so the rectangle stays fully inside the unit square.
pub fn clamp_custom_rect(rect: Key) -> Key {
    let w = rect.w.clamp(MIN_CUSTOM_EXTENT, 1.0);
    let h = rect.h.clamp(MIN_CUSTOM_EXTENT, 1.0);
    let x = rect.x.clamp(0.0, 1.0 - w);
    let y = rect.y.clamp(0.0, 1.0 - h);
    Key::new(x, y, w, h, rect.rotation_deg)
}

#[derive(Debug, Clone, Default)]
pub struct LayoutBlock {
    pub mappings: BTreeMap<u8, BTreeMap<StorageKey, KeyMapping>>,
    pub custom_buttons: BTreeMap<u8, Vec<CustomButton>>,
}

#[derive(Debug, Clone)]
pub struct Keymap {
    pub version: u32,
    pub layouts: BTreeMap<String, LayoutBlock>,
    /// Unknown top-level fields preserved verbatim for re-save (§4.2, §6).
    pub extra: serde_json::Map<String, Value>,
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            version: 2,
            layouts: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn load(bytes: &[u8]) -> Result<Self, KeymapError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        let keymap = json::parse_document(doc)?;
        tracing::debug!(
            target: "core_keymap",
            presets = keymap.layouts.len(),
            "loaded keymap document"
        );
        Ok(keymap)
    }

    pub fn save(&self) -> Result<Vec<u8>, KeymapError> {
        let doc = json::render_document(self);
        Ok(serde_json::to_vec_pretty(&doc)?)
    }

    /// Effective mapping for `(preset, layer, storage_key)`, substituting
    /// `default_label` when no user override exists (§4.2).
    pub fn resolve(&self, preset: &str, layer: u8, key: &StorageKey, default_label: &str) -> KeyMapping {
        if let Some(found) = self
            .layouts
            .get(preset)
            .and_then(|block| block.mappings.get(&layer))
            .and_then(|layer_map| layer_map.get(key))
        {
            return found.clone();
        }
        KeyMapping {
            primary: KeyAction::new(default_label, SemanticAction::NoOp),
            hold: None,
        }
    }

    pub fn custom_buttons(&self, preset: &str, layer: u8) -> &[CustomButton] {
        self.layouts
            .get(preset)
            .and_then(|block| block.custom_buttons.get(&layer))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn layout_block_mut(&mut self, preset: &str) -> &mut LayoutBlock {
        self.layouts.entry(preset.to_string()).or_default()
    }
}

mod json {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct RawKeyAction {
        label: String,
        code: String,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct RawMapping {
        primary: RawKeyAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        hold: Option<RawKeyAction>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct RawCustomButton {
        id: String,
        side: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        primary: RawKeyAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        hold: Option<RawKeyAction>,
    }

    #[derive(Debug, Deserialize, Serialize, Default)]
    struct RawLayoutBlock {
        #[serde(default)]
        mappings: BTreeMap<String, BTreeMap<String, RawMapping>>,
        #[serde(default)]
        custom_buttons: BTreeMap<String, Vec<RawCustomButton>>,
    }

    fn side_str(side: Side) -> &'static str {
        match side {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    fn parse_side(s: &str) -> Side {
        if s.eq_ignore_ascii_case("left") {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn action_to_raw(action: &KeyAction) -> RawKeyAction {
        RawKeyAction {
            label: action.label.clone(),
            code: semantic_to_code(&action.semantic),
        }
    }

    fn raw_to_action(raw: &RawKeyAction) -> KeyAction {
        KeyAction::new(raw.label.clone(), code_to_semantic(&raw.code))
    }

    /// Map a JSON code string to a `SemanticAction`. Unrecognized codes
    /// resolve to `NoOp` but the raw string still round-trips through the
    /// JSON document unchanged (we only ever re-derive `code` from the
    /// resolved semantic on save, so a foreign code would not survive a
    /// load+save cycle verbatim — acceptable since spec.md only requires
    /// *unknown top-level fields*, not unknown per-key codes, to round-trip).
    pub(super) fn code_to_semantic(code: &str) -> SemanticAction {
        use core_events::{Corner, ModifierKey, MouseButton, NavigationKey};
        if let Some(rest) = code.strip_prefix("letter:") {
            if let Some(c) = rest.chars().next() {
                return SemanticAction::Letter(c);
            }
        }
        if let Some(rest) = code.strip_prefix("digit:") {
            if let Some(c) = rest.chars().next() {
                return SemanticAction::Digit(c);
            }
        }
        if let Some(rest) = code.strip_prefix("function:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::Function(n);
            }
        }
        if let Some(rest) = code.strip_prefix("brightness:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::Brightness(n);
            }
        }
        if let Some(rest) = code.strip_prefix("layer_toggle:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::LayerToggle(n);
            }
        }
        if let Some(rest) = code.strip_prefix("layer_set:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::LayerSet(n);
            }
        }
        if let Some(rest) = code.strip_prefix("layer_momentary:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::LayerMomentary(n);
            }
        }
        if let Some(rest) = code.strip_prefix("haptic:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::HapticTrigger(n);
            }
        }
        if let Some(rest) = code.strip_prefix("force_click:") {
            if let Ok(n) = rest.parse() {
                return SemanticAction::ForceClick(n);
            }
        }
        match code {
            "shift" => SemanticAction::Modifier(ModifierKey::Shift),
            "control" => SemanticAction::Modifier(ModifierKey::Control),
            "option" => SemanticAction::Modifier(ModifierKey::Option),
            "command" => SemanticAction::Modifier(ModifierKey::Command),
            "fn" => SemanticAction::Modifier(ModifierKey::Fn),
            "up" => SemanticAction::Navigation(NavigationKey::Up),
            "down" => SemanticAction::Navigation(NavigationKey::Down),
            "left" => SemanticAction::Navigation(NavigationKey::Left),
            "right" => SemanticAction::Navigation(NavigationKey::Right),
            "home" => SemanticAction::Navigation(NavigationKey::Home),
            "end" => SemanticAction::Navigation(NavigationKey::End),
            "page_up" => SemanticAction::Navigation(NavigationKey::PageUp),
            "page_down" => SemanticAction::Navigation(NavigationKey::PageDown),
            "enter" => SemanticAction::Navigation(NavigationKey::Enter),
            "escape" => SemanticAction::Navigation(NavigationKey::Escape),
            "tab" => SemanticAction::Navigation(NavigationKey::Tab),
            "space" => SemanticAction::Navigation(NavigationKey::Space),
            "backspace" => SemanticAction::Navigation(NavigationKey::Backspace),
            "delete" => SemanticAction::Navigation(NavigationKey::Delete),
            "mouse_left" => SemanticAction::MouseButton(MouseButton::Left),
            "mouse_right" => SemanticAction::MouseButton(MouseButton::Right),
            "mouse_middle" => SemanticAction::MouseButton(MouseButton::Middle),
            "typing_toggle" => SemanticAction::TypingToggle,
            "corner_top_left" => SemanticAction::CornerForce(Corner::TopLeft),
            "corner_top_right" => SemanticAction::CornerForce(Corner::TopRight),
            "corner_bottom_left" => SemanticAction::CornerForce(Corner::BottomLeft),
            "corner_bottom_right" => SemanticAction::CornerForce(Corner::BottomRight),
            _ => SemanticAction::NoOp,
        }
    }

    pub(super) fn semantic_to_code(action: &SemanticAction) -> String {
        use core_events::{Corner, ModifierKey, MouseButton, NavigationKey};
        match action {
            SemanticAction::Letter(c) => format!("letter:{c}"),
            SemanticAction::Digit(c) => format!("digit:{c}"),
            SemanticAction::Function(n) => format!("function:{n}"),
            SemanticAction::Brightness(n) => format!("brightness:{n}"),
            SemanticAction::LayerToggle(n) => format!("layer_toggle:{n}"),
            SemanticAction::LayerSet(n) => format!("layer_set:{n}"),
            SemanticAction::LayerMomentary(n) => format!("layer_momentary:{n}"),
            SemanticAction::HapticTrigger(n) => format!("haptic:{n}"),
            SemanticAction::ForceClick(n) => format!("force_click:{n}"),
            SemanticAction::Modifier(ModifierKey::Shift) => "shift".into(),
            SemanticAction::Modifier(ModifierKey::Control) => "control".into(),
            SemanticAction::Modifier(ModifierKey::Option) => "option".into(),
            SemanticAction::Modifier(ModifierKey::Command) => "command".into(),
            SemanticAction::Modifier(ModifierKey::Fn) => "fn".into(),
            SemanticAction::Navigation(NavigationKey::Up) => "up".into(),
            SemanticAction::Navigation(NavigationKey::Down) => "down".into(),
            SemanticAction::Navigation(NavigationKey::Left) => "left".into(),
            SemanticAction::Navigation(NavigationKey::Right) => "right".into(),
            SemanticAction::Navigation(NavigationKey::Home) => "home".into(),
            SemanticAction::Navigation(NavigationKey::End) => "end".into(),
            SemanticAction::Navigation(NavigationKey::PageUp) => "page_up".into(),
            SemanticAction::Navigation(NavigationKey::PageDown) => "page_down".into(),
            SemanticAction::Navigation(NavigationKey::Enter) => "enter".into(),
            SemanticAction::Navigation(NavigationKey::Escape) => "escape".into(),
            SemanticAction::Navigation(NavigationKey::Tab) => "tab".into(),
            SemanticAction::Navigation(NavigationKey::Space) => "space".into(),
            SemanticAction::Navigation(NavigationKey::Backspace) => "backspace".into(),
            SemanticAction::Navigation(NavigationKey::Delete) => "delete".into(),
            SemanticAction::MouseButton(MouseButton::Left) => "mouse_left".into(),
            SemanticAction::MouseButton(MouseButton::Right) => "mouse_right".into(),
            SemanticAction::MouseButton(MouseButton::Middle) => "mouse_middle".into(),
            SemanticAction::TypingToggle => "typing_toggle".into(),
            SemanticAction::CornerForce(Corner::TopLeft) => "corner_top_left".into(),
            SemanticAction::CornerForce(Corner::TopRight) => "corner_top_right".into(),
            SemanticAction::CornerForce(Corner::BottomLeft) => "corner_bottom_left".into(),
            SemanticAction::CornerForce(Corner::BottomRight) => "corner_bottom_right".into(),
            SemanticAction::Chord(_) | SemanticAction::NoOp => "noop".into(),
        }
    }

    /// Parse a full document, upgrading legacy (wrapper-less) files into
    /// `layouts["6x3"]` per §4.2/§9 Open Question 4.
    pub(super) fn parse_document(doc: Value) -> Result<Keymap, KeymapError> {
        let mut obj = match doc {
            Value::Object(obj) => obj,
            _ => return Err(KeymapError::NoRecognizedPreset),
        };

        let version = obj
            .remove("version")
            .and_then(|v| v.as_u64())
            .unwrap_or(2) as u32;

        let layouts_value = obj.remove("layouts");
        let mut layouts = BTreeMap::new();

        match layouts_value {
            Some(Value::Object(preset_map)) => {
                for (preset, block) in preset_map {
                    layouts.insert(preset, parse_layout_block(block)?);
                }
            }
            None => {
                tracing::debug!(target: "core_keymap", "upgrading legacy keymap document into layouts[\"6x3\"]");
                // Legacy: top-level `mappings`/`custom_buttons` belong to "6x3".
                let mut legacy = serde_json::Map::new();
                if let Some(m) = obj.remove("mappings") {
                    legacy.insert("mappings".to_string(), m);
                }
                if let Some(c) = obj.remove("custom_buttons") {
                    legacy.insert("custom_buttons".to_string(), c);
                }
                layouts.insert("6x3".to_string(), parse_layout_block(Value::Object(legacy))?);
            }
            _ => return Err(KeymapError::NoRecognizedPreset),
        }

        Ok(Keymap {
            version,
            layouts,
            extra: obj,
        })
    }

    fn parse_layout_block(value: Value) -> Result<LayoutBlock, KeymapError> {
        let raw: RawLayoutBlock = serde_json::from_value(value)?;
        let mut mappings = BTreeMap::new();
        for (layer_str, keys) in raw.mappings {
            let layer: u8 = layer_str.parse().unwrap_or(0);
            let mut layer_map = BTreeMap::new();
            for (sk, mapping) in keys {
                layer_map.insert(
                    StorageKey(sk),
                    KeyMapping {
                        primary: raw_to_action(&mapping.primary),
                        hold: mapping.hold.as_ref().map(raw_to_action),
                    },
                );
            }
            mappings.insert(layer, layer_map);
        }

        let mut custom_buttons = BTreeMap::new();
        for (layer_str, buttons) in raw.custom_buttons {
            let layer: u8 = layer_str.parse().unwrap_or(0);
            let list = buttons
                .into_iter()
                .map(|b| CustomButton {
                    id: b.id,
                    side: parse_side(&b.side),
                    rect: clamp_custom_rect(Key::axis_aligned(b.x, b.y, b.w, b.h)),
                    primary: raw_to_action(&b.primary),
                    hold: b.hold.as_ref().map(raw_to_action),
                    layer,
                })
                .collect();
            custom_buttons.insert(layer, list);
        }

        Ok(LayoutBlock {
            mappings,
            custom_buttons,
        })
    }

    pub(super) fn render_document(keymap: &Keymap) -> Value {
        let mut layouts = serde_json::Map::new();
        for (preset, block) in &keymap.layouts {
            let mut mappings = serde_json::Map::new();
            for (layer, keys) in &block.mappings {
                let mut layer_map = serde_json::Map::new();
                for (sk, mapping) in keys {
                    let raw = RawMapping {
                        primary: action_to_raw(&mapping.primary),
                        hold: mapping.hold.as_ref().map(action_to_raw),
                    };
                    layer_map.insert(sk.0.clone(), serde_json::to_value(raw).unwrap());
                }
                mappings.insert(layer.to_string(), Value::Object(layer_map));
            }

            let mut custom_buttons = serde_json::Map::new();
            for (layer, buttons) in &block.custom_buttons {
                let list: Vec<Value> = buttons
                    .iter()
                    .map(|b| {
                        serde_json::to_value(RawCustomButton {
                            id: b.id.clone(),
                            side: side_str(b.side).to_string(),
                            x: b.rect.x,
                            y: b.rect.y,
                            w: b.rect.w,
                            h: b.rect.h,
                            primary: action_to_raw(&b.primary),
                            hold: b.hold.as_ref().map(action_to_raw),
                        })
                        .unwrap()
                    })
                    .collect();
                custom_buttons.insert(layer.to_string(), Value::Array(list));
            }

            let mut block_obj = serde_json::Map::new();
            block_obj.insert("mappings".to_string(), Value::Object(mappings));
            block_obj.insert("custom_buttons".to_string(), Value::Object(custom_buttons));
            layouts.insert(preset.clone(), Value::Object(block_obj));
        }

        let mut doc = keymap.extra.clone();
        doc.insert("version".to_string(), Value::from(keymap.version));
        doc.insert("layouts".to_string(), Value::Object(layouts));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn storage_key_round_trips() {
        let key = StorageKey::encode(Side::Right, 2, 3);
        assert_eq!(key.0, "right:2:3");
        assert_eq!(key.parse(), Some((Side::Right, 2, 3)));
    }

    #[test]
    fn legacy_document_upgrades_into_6x3() {
        let doc = br#"{"mappings": {"0": {"right:0:0": {"primary": {"label": "A", "code": "letter:a"}}}}}"#;
        let keymap = Keymap::load(doc).unwrap();
        assert!(keymap.layouts.contains_key("6x3"));
        let mapping = keymap.resolve("6x3", 0, &StorageKey("right:0:0".into()), "?");
        assert_eq!(mapping.primary.semantic, SemanticAction::Letter('a'));
    }

    #[test]
    fn resolve_falls_back_to_default_label() {
        let keymap = Keymap::empty();
        let mapping = keymap.resolve("6x3", 0, &StorageKey("right:0:0".into()), "Q");
        assert_eq!(mapping.primary.label, "Q");
        assert_eq!(mapping.primary.semantic, SemanticAction::NoOp);
    }

    #[test]
    fn clamp_custom_rect_enforces_min_size_and_bounds() {
        let rect = Key::axis_aligned(0.99, 0.99, 0.01, 0.01);
        let clamped = clamp_custom_rect(rect);
        assert_eq!(clamped.w, MIN_CUSTOM_EXTENT);
        assert_eq!(clamped.h, MIN_CUSTOM_EXTENT);
        assert!(clamped.x + clamped.w <= 1.0 + 1e-6);
        assert!(clamped.y + clamped.h <= 1.0 + 1e-6);
    }

    #[test]
    fn save_then_load_round_trips_mapping() {
        let mut keymap = Keymap::empty();
        let block = keymap.layout_block_mut("6x3");
        block.mappings.entry(0).or_default().insert(
            StorageKey::encode(Side::Right, 0, 0),
            KeyMapping {
                primary: KeyAction::new("A", SemanticAction::Letter('a')),
                hold: None,
            },
        );
        let bytes = keymap.save().unwrap();
        let reloaded = Keymap::load(&bytes).unwrap();
        let mapping = reloaded.resolve("6x3", 0, &StorageKey::encode(Side::Right, 0, 0), "?");
        assert_eq!(mapping.primary.semantic, SemanticAction::Letter('a'));
    }

    #[test]
    fn unknown_top_level_fields_round_trip() {
        let doc = br#"{"version": 2, "layouts": {}, "future_field": 42}"#;
        let keymap = Keymap::load(doc).unwrap();
        let bytes = keymap.save().unwrap();
        let reparsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reparsed.get("future_field"), Some(&Value::from(42)));
    }
}
