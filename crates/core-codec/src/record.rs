//! Per-record header (§4.10): 34 bytes identifying which capture device a
//! record came from, wrapping either the one JSON meta payload or a binary
//! frame payload.

use std::io::{Read, Write};

use crate::error::CodecError;

pub const RECORD_HEADER_LEN: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader {
    pub arrival_ticks: i64,
    pub device_index: i32,
    pub device_hash: u32,
    pub vendor_id: u32,
    pub product_id: u32,
    pub usage_page: u16,
    pub usage: u16,
    pub side_hint: u8,
    pub decoder_profile: u8,
}

impl RecordHeader {
    /// Sentinel header for the one meta record at the start of a capture,
    /// which isn't tied to a capture device.
    pub fn meta(arrival_ticks: i64) -> Self {
        Self {
            arrival_ticks,
            device_index: -1,
            device_hash: 0,
            vendor_id: 0,
            product_id: 0,
            usage_page: 0,
            usage: 0,
            side_hint: 0,
            decoder_profile: 0,
        }
    }

    pub(crate) fn write(&self, writer: &mut impl Write, payload_len: usize) -> Result<(), CodecError> {
        let payload_len = i32::try_from(payload_len).map_err(|_| CodecError::InvalidPayloadLength(i32::MAX))?;
        writer.write_all(&payload_len.to_le_bytes())?;
        writer.write_all(&self.arrival_ticks.to_le_bytes())?;
        writer.write_all(&self.device_index.to_le_bytes())?;
        writer.write_all(&self.device_hash.to_le_bytes())?;
        writer.write_all(&self.vendor_id.to_le_bytes())?;
        writer.write_all(&self.product_id.to_le_bytes())?;
        writer.write_all(&self.usage_page.to_le_bytes())?;
        writer.write_all(&self.usage.to_le_bytes())?;
        writer.write_all(&[self.side_hint, self.decoder_profile])?;
        Ok(())
    }

    /// Returns `None` at a clean end-of-stream (zero bytes read before the
    /// header even starts); any other short read is a genuine truncation.
    pub(crate) fn read(reader: &mut impl Read) -> Result<Option<(Self, usize)>, CodecError> {
        let mut len_bytes = [0u8; 4];
        if !read_fully_or_eof(reader, &mut len_bytes)? {
            return Ok(None);
        }
        let payload_length = i32::from_le_bytes(len_bytes);
        if payload_length < 0 {
            return Err(CodecError::InvalidPayloadLength(payload_length));
        }

        let mut rest = [0u8; RECORD_HEADER_LEN - 4];
        reader.read_exact(&mut rest).map_err(|_| CodecError::TruncatedRecordHeader)?;

        let arrival_ticks = i64::from_le_bytes(rest[0..8].try_into().unwrap());
        let device_index = i32::from_le_bytes(rest[8..12].try_into().unwrap());
        let device_hash = u32::from_le_bytes(rest[12..16].try_into().unwrap());
        let vendor_id = u32::from_le_bytes(rest[16..20].try_into().unwrap());
        let product_id = u32::from_le_bytes(rest[20..24].try_into().unwrap());
        let usage_page = u16::from_le_bytes(rest[24..26].try_into().unwrap());
        let usage = u16::from_le_bytes(rest[26..28].try_into().unwrap());
        let side_hint = rest[28];
        let decoder_profile = rest[29];

        let header = Self {
            arrival_ticks,
            device_index,
            device_hash,
            vendor_id,
            product_id,
            usage_page,
            usage,
            side_hint,
            decoder_profile,
        };
        Ok(Some((header, payload_length as usize)))
    }
}

/// Reads `buf.len()` bytes, returning `Ok(false)` only if the stream was
/// already at EOF before any byte was read (a clean end), and
/// `Err(TruncatedRecordHeader)` if it ran out partway through.
fn read_fully_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> Result<bool, CodecError> {
    let mut read_total = 0;
    while read_total < buf.len() {
        match reader.read(&mut buf[read_total..])? {
            0 if read_total == 0 => return Ok(false),
            0 => return Err(CodecError::TruncatedRecordHeader),
            n => read_total += n,
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_through_write_and_read() {
        let header = RecordHeader {
            arrival_ticks: 42,
            device_index: 1,
            device_hash: 0xdead_beef,
            vendor_id: 0x05ac,
            product_id: 0x0272,
            usage_page: 1,
            usage: 2,
            side_hint: 1,
            decoder_profile: 0,
        };
        let mut buf = Vec::new();
        header.write(&mut buf, 128).unwrap();
        assert_eq!(buf.len(), RECORD_HEADER_LEN);

        let (read_back, payload_len) = RecordHeader::read(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(read_back, header);
        assert_eq!(payload_len, 128);
    }

    #[test]
    fn empty_stream_reads_as_clean_eof() {
        let mut empty: &[u8] = &[];
        assert!(RecordHeader::read(&mut empty).unwrap().is_none());
    }

    #[test]
    fn partial_header_is_a_truncation_error() {
        let mut buf = vec![0u8; 10];
        assert!(matches!(RecordHeader::read(&mut buf.as_slice()), Err(CodecError::TruncatedRecordHeader)));
    }
}
