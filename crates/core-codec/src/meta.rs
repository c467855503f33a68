//! The single JSON meta record every capture opens with (§4.10).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub schema: String,
    pub captured_at: String,
    pub platform: String,
    pub source: String,
    pub frames_captured: u64,
}

impl MetaRecord {
    pub fn new(captured_at: impl Into<String>, platform: impl Into<String>, source: impl Into<String>, frames_captured: u64) -> Self {
        Self {
            record_type: "meta".to_string(),
            schema: "g2k-replay-v1".to_string(),
            captured_at: captured_at.into(),
            platform: platform.into(),
            source: source.into(),
            frames_captured,
        }
    }
}
