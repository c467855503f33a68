//! Capture file header (§4.10): an 8-byte magic, a 4-byte version, and an
//! 8-byte tick frequency, all little-endian.

use std::io::{Read, Write};

use crate::error::CodecError;

pub const MAGIC: &[u8; 8] = b"ATPCAP01";
pub const CURRENT_VERSION: i32 = 3;
const MIN_SUPPORTED_VERSION: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub version: i32,
    pub tick_frequency: i64,
}

impl CaptureHeader {
    pub fn write(writer: &mut impl Write, tick_frequency: i64) -> Result<(), CodecError> {
        writer.write_all(MAGIC)?;
        writer.write_all(&CURRENT_VERSION.to_le_bytes())?;
        writer.write_all(&tick_frequency.to_le_bytes())?;
        Ok(())
    }

    pub fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic).map_err(|_| CodecError::InvalidHeader)?;
        if &magic != MAGIC {
            return Err(CodecError::InvalidHeader);
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes).map_err(|_| CodecError::InvalidHeader)?;
        let version = i32::from_le_bytes(version_bytes);
        if version < MIN_SUPPORTED_VERSION || version > CURRENT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let mut freq_bytes = [0u8; 8];
        reader.read_exact(&mut freq_bytes).map_err(|_| CodecError::InvalidHeader)?;
        let tick_frequency = i64::from_le_bytes(freq_bytes);

        Ok(Self { version, tick_frequency })
    }
}
