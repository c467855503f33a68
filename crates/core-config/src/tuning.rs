//! Touch-processor timing and motion thresholds (§4.5/§4.6, §9 Open Question 2).
//!
//! The spec leaves exact values to hardware calibration; the defaults here
//! are the spec's stated approximations (`≈` values) with a conservative
//! guess filled in where the spec names a threshold but no magnitude.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TouchProcessorConfig {
    pub hold_ms: u32,
    pub tap_window_ms: u32,
    pub tap_motion: f32,
    pub drag_cancel: f32,
    pub mouse_motion_threshold: f32,
    pub mouse_confirm_ms: u32,
    pub swipe_window_ms: u32,
    pub swipe_threshold: f32,
    pub repeat_interval_ms: u32,
    pub snap_radius: f32,
    /// §9 Open Question 3: whether the five-finger typing-toggle swipe must
    /// move the same direction on both sides, or any direction on either.
    pub swipe_requires_same_direction: bool,
}

impl Default for TouchProcessorConfig {
    fn default() -> Self {
        Self {
            hold_ms: 220,
            tap_window_ms: 180,
            tap_motion: 0.03,
            drag_cancel: 0.08,
            mouse_motion_threshold: 0.02,
            mouse_confirm_ms: 150,
            swipe_window_ms: 350,
            swipe_threshold: 0.3,
            repeat_interval_ms: 40,
            snap_radius: 0.05,
            swipe_requires_same_direction: true,
        }
    }
}

const LOCAL_FILE: &str = "glasstokey-tuning.json";

/// Best-effort config path: local override, else platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(LOCAL_FILE);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("glasstokey").join("tuning.json");
    }
    PathBuf::from(LOCAL_FILE)
}

pub fn load_from(path: Option<PathBuf>) -> TouchProcessorConfig {
    let path = path.unwrap_or_else(discover);
    load_from_path(&path)
}

fn load_from_path(path: &Path) -> TouchProcessorConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => {
                tracing::debug!(target: "core_config", path = %path.display(), "loaded tuning config");
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: "core_config",
                    path = %path.display(),
                    error = %err,
                    "malformed tuning config, falling back to defaults"
                );
                TouchProcessorConfig::default()
            }
        },
        Err(_) => TouchProcessorConfig::default(),
    }
}
