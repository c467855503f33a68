//! Platform-neutral settings file (§6): device identities, default layer
//! and layout, typing/keyboard-mode defaults, haptics, and per-device
//! decoder profile (replay only).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HapticsSettings {
    pub enabled: bool,
    pub strength_level: u8,
    pub min_interval_ms: u32,
}

impl Default for HapticsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength_level: 1,
            min_interval_ms: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub left_device_id: Option<String>,
    pub right_device_id: Option<String>,
    pub active_layer: u8,
    pub layout_preset: String,
    pub typing_enabled_default: bool,
    pub keyboard_mode_default: bool,
    pub haptics: HapticsSettings,
    /// Device path/identifier -> decoder profile byte (§4.10 record header).
    pub decoder_profile_by_device: BTreeMap<String, u8>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            left_device_id: None,
            right_device_id: None,
            active_layer: 0,
            layout_preset: "6x3".to_string(),
            typing_enabled_default: true,
            keyboard_mode_default: false,
            haptics: HapticsSettings::default(),
            decoder_profile_by_device: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

const LOCAL_FILE: &str = "glasstokey-settings.json";

pub fn discover() -> PathBuf {
    let local = PathBuf::from(LOCAL_FILE);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("glasstokey").join("settings.json");
    }
    PathBuf::from(LOCAL_FILE)
}

pub fn load_from(path: Option<PathBuf>) -> Settings {
    let path = path.unwrap_or_else(discover);
    load_from_path(&path)
}

fn load_from_path(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => {
                tracing::debug!(target: "core_config", path = %path.display(), "loaded settings");
                settings
            }
            Err(err) => {
                tracing::warn!(
                    target: "core_config",
                    path = %path.display(),
                    error = %err,
                    "malformed settings file, falling back to defaults"
                );
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Persist `settings` back to `path`, sorted keys, per §6's keymap-file
/// round-trip convention applied here too.
pub fn save_to(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(settings)?;
    fs::write(path, bytes)?;
    Ok(())
}
