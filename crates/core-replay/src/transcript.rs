//! Canonical newline-delimited transcript (§4.11): one sorted-key JSON
//! object per accepted frame. Determinism comes from `serde_json::Map`'s
//! `BTreeMap` backing (sorted by construction) rather than any manual key
//! ordering, so two runs over the same fixture byte-for-byte agree.

use serde::Serialize;

use core_snapshot::Diagnostics;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptDiagnostics {
    pub capture_frames: u64,
    pub capture_frame_overflow: u64,
    pub capture_frame_non_monotonic: u64,
    pub engine_frames: u64,
    pub dispatch_dropped: u64,
}

impl From<&Diagnostics> for TranscriptDiagnostics {
    fn from(diagnostics: &Diagnostics) -> Self {
        Self {
            capture_frames: diagnostics.capture_frames,
            capture_frame_overflow: diagnostics.capture_frame_overflow,
            capture_frame_non_monotonic: diagnostics.capture_frame_non_monotonic,
            engine_frames: diagnostics.engine_frames,
            dispatch_dropped: diagnostics.dispatch_dropped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptRecord {
    pub seq: u64,
    pub device_index: i32,
    pub contact_count: usize,
    pub render_revision: u64,
    pub left_contacts: usize,
    pub right_contacts: usize,
    pub capture_frames: u64,
    pub diagnostics: TranscriptDiagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub records: Vec<TranscriptRecord>,
}

impl Transcript {
    /// One sorted-key JSON object per line, matching exactly what a second
    /// independent run over the same fixture must reproduce.
    pub fn to_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            let value = serde_json::to_value(record)?;
            out.push_str(&serde_json::to_string(&value)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_serialize_with_sorted_keys() {
        let transcript = Transcript {
            records: vec![TranscriptRecord {
                seq: 1,
                device_index: 0,
                contact_count: 1,
                render_revision: 1,
                left_contacts: 1,
                right_contacts: 0,
                capture_frames: 1,
                diagnostics: TranscriptDiagnostics::default(),
            }],
        };
        let lines = transcript.to_lines().unwrap();
        let first_brace = lines.find('{').unwrap();
        let capture_pos = lines[first_brace..].find("\"capture_frames\"").unwrap();
        let seq_pos = lines[first_brace..].find("\"seq\"").unwrap();
        assert!(capture_pos < seq_pos, "keys must come out alphabetically sorted");
    }
}
