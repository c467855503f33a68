//! Replay capture codec (§4.10): the `ATPCAP01` binary format — an 8-byte
//! magic, one JSON meta record, then a stream of `RFV3` frame records.
//! Readers accept versions 2 and 3; writers always emit 3. Every structural
//! violation surfaces as a distinct [`CodecError`] variant rather than a
//! generic I/O error, since a malformed fixture is a fatal, not a
//! recoverable, condition (§7).

mod error;
mod frame;
mod header;
mod meta;
mod reader;
mod record;
mod writer;

pub use error::CodecError;
pub use frame::{decode_frame, encode_frame, ContactRecord, ContactState, FrameRecord, FRAME_MAGIC};
pub use header::{CaptureHeader, CURRENT_VERSION, MAGIC};
pub use meta::MetaRecord;
pub use reader::CaptureReader;
pub use record::{RecordHeader, RECORD_HEADER_LEN};
pub use writer::CaptureWriter;
