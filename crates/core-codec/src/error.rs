//! The codec's failure taxonomy (§7: "fixture/codec errors are fatal at
//! load" — nothing here is recoverable the way a malformed settings file
//! is, so every variant is returned, never swallowed into a default).

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid capture header")]
    InvalidHeader,

    #[error("unsupported capture version: {0}")]
    UnsupportedVersion(i32),

    #[error("truncated record header")]
    TruncatedRecordHeader,

    #[error("truncated record payload")]
    TruncatedRecordPayload,

    #[error("invalid payload length: {0}")]
    InvalidPayloadLength(i32),

    #[error("frame payload magic mismatch")]
    FramePayloadMagicMismatch,

    #[error("invalid contact state code: {0}")]
    InvalidStateCode(u8),

    #[error("meta record declared {declared} frames, capture contains {actual}")]
    MetaFrameCountMismatch { declared: u64, actual: u64 },

    #[error("invalid sequence: expected greater than {previous}, got {got}")]
    InvalidSequence { previous: u64, got: u64 },

    #[error("non-monotonic arrival ticks: previous {previous}, got {got}")]
    NonMonotonicArrivalTicks { previous: i64, got: i64 },

    #[error("malformed meta record: {0}")]
    MalformedMeta(#[from] serde_json::Error),
}
