//! Ambient configuration: tuning constants (§9 Open Question 2) and the
//! platform-neutral settings file (§6).
//!
//! Both follow the same resilience policy: prefer a local override file,
//! else a platform config directory, else built-in defaults; a malformed
//! file on disk never fails startup, it just falls back to defaults.

pub mod settings;
pub mod tuning;

pub use settings::{HapticsSettings, Settings};
pub use tuning::TouchProcessorConfig;
