//! Capture reader (§4.10): validates the header, reads the one leading meta
//! record, then yields frame records until a clean end-of-stream, checking
//! every invariant the writer is trusted to uphold (§8 universal
//! invariants carry over to replay inputs too — a corrupt fixture must fail
//! loudly, not silently desync the harness).

use std::io::Read;

use crate::error::CodecError;
use crate::frame::{decode_frame, FrameRecord};
use crate::header::CaptureHeader;
use crate::meta::MetaRecord;
use crate::record::RecordHeader;

pub struct CaptureReader<R: Read> {
    inner: R,
    header: CaptureHeader,
    meta: MetaRecord,
    frames_read: u64,
    last_seq: Option<u64>,
    last_arrival_ticks: i64,
    finished: bool,
}

impl<R: Read> CaptureReader<R> {
    pub fn open(mut inner: R) -> Result<Self, CodecError> {
        let header = CaptureHeader::read(&mut inner)?;

        let (meta_header, payload_len) = RecordHeader::read(&mut inner)?.ok_or(CodecError::InvalidHeader)?;
        let mut payload = vec![0u8; payload_len];
        inner.read_exact(&mut payload).map_err(|_| CodecError::TruncatedRecordPayload)?;
        let meta: MetaRecord = serde_json::from_slice(&payload)?;

        Ok(Self {
            inner,
            header,
            last_arrival_ticks: meta_header.arrival_ticks,
            meta,
            frames_read: 0,
            last_seq: None,
            finished: false,
        })
    }

    pub fn tick_frequency(&self) -> i64 {
        self.header.tick_frequency
    }

    pub fn meta(&self) -> &MetaRecord {
        &self.meta
    }

    /// Yields the next record header paired with its decoded frame, or
    /// `Ok(None)` once the stream ends cleanly and the total frame count
    /// matches what the meta record declared.
    pub fn next_frame(&mut self) -> Result<Option<(RecordHeader, FrameRecord)>, CodecError> {
        if self.finished {
            return Ok(None);
        }

        let Some((record_header, payload_len)) = RecordHeader::read(&mut self.inner)? else {
            self.finished = true;
            if self.frames_read != self.meta.frames_captured {
                return Err(CodecError::MetaFrameCountMismatch {
                    declared: self.meta.frames_captured,
                    actual: self.frames_read,
                });
            }
            return Ok(None);
        };

        if record_header.arrival_ticks < self.last_arrival_ticks {
            return Err(CodecError::NonMonotonicArrivalTicks {
                previous: self.last_arrival_ticks,
                got: record_header.arrival_ticks,
            });
        }
        self.last_arrival_ticks = record_header.arrival_ticks;

        let mut payload = vec![0u8; payload_len];
        self.inner.read_exact(&mut payload).map_err(|_| CodecError::TruncatedRecordPayload)?;
        let frame = decode_frame(&payload)?;

        if let Some(previous) = self.last_seq {
            if frame.seq <= previous {
                return Err(CodecError::InvalidSequence { previous, got: frame.seq });
            }
        }
        self.last_seq = Some(frame.seq);
        self.frames_read += 1;

        Ok(Some((record_header, frame)))
    }
}
