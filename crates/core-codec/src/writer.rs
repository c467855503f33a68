//! Capture writer (§4.10): always writes the current version, regardless of
//! which versions the reader accepts.

use std::io::Write;

use crate::error::CodecError;
use crate::frame::{encode_frame, FrameRecord};
use crate::header::CaptureHeader;
use crate::meta::MetaRecord;
use crate::record::RecordHeader;

pub struct CaptureWriter<W: Write> {
    inner: W,
    frames_written: u64,
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(mut inner: W, tick_frequency: i64) -> Result<Self, CodecError> {
        CaptureHeader::write(&mut inner, tick_frequency)?;
        Ok(Self { inner, frames_written: 0 })
    }

    pub fn write_meta(&mut self, arrival_ticks: i64, meta: &MetaRecord) -> Result<(), CodecError> {
        let payload = serde_json::to_vec(meta)?;
        RecordHeader::meta(arrival_ticks).write(&mut self.inner, payload.len())?;
        self.inner.write_all(&payload)?;
        Ok(())
    }

    pub fn write_frame(&mut self, header: &RecordHeader, frame: &FrameRecord) -> Result<(), CodecError> {
        let payload = encode_frame(frame);
        header.write(&mut self.inner, payload.len())?;
        self.inner.write_all(&payload)?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ContactRecord, ContactState};
    use crate::reader::CaptureReader;

    #[test]
    fn a_written_capture_round_trips_through_the_reader() {
        let mut writer = CaptureWriter::new(Vec::new(), 1_000_000).unwrap();
        writer.write_meta(0, &MetaRecord::new("now", "macos", "fixture", 1)).unwrap();
        writer
            .write_frame(
                &RecordHeader { arrival_ticks: 5, device_index: 0, device_hash: 1, vendor_id: 0x05ac, product_id: 0x0272, usage_page: 1, usage: 2, side_hint: 0, decoder_profile: 0 },
                &FrameRecord {
                    seq: 1,
                    timestamp_sec: 0.1,
                    device_numeric_id: 1,
                    contacts: vec![ContactRecord {
                        id: 1,
                        x: 0.2,
                        y: 0.3,
                        total: 1.0,
                        pressure: 0.4,
                        major_axis: 0.1,
                        minor_axis: 0.05,
                        angle: 0.0,
                        density: 1.0,
                        state: ContactState::Touching,
                    }],
                },
            )
            .unwrap();

        let bytes = writer.into_inner();
        let mut reader = CaptureReader::open(bytes.as_slice()).unwrap();
        assert_eq!(reader.meta().frames_captured, 1);
        let (_header, frame) = reader.next_frame().unwrap().unwrap();
        assert_eq!(frame.seq, 1);
        assert!(reader.next_frame().unwrap().is_none());
    }
}
