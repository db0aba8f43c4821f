//! Error types for binary XML decoding and encoding.

use thiserror::Error;

/// Errors that can occur when decoding or encoding binary XML frames.
#[derive(Debug, Error)]
pub enum Error {
    /// Primitive-codec error from the common reader.
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Tag byte with no registered record form.
    #[error("unknown record type 0x{tag:02x} at offset {offset}")]
    UnknownRecordType { tag: u8, offset: usize },

    /// Buffer exhausted in the middle of a record.
    #[error("truncated record at offset {offset}")]
    TruncatedRecord { offset: usize },

    /// End-element record with no open element.
    #[error("end-element record at offset {offset} with no open element")]
    UnexpectedEndElement { offset: usize },

    /// Element nesting beyond the hardening bound.
    #[error("element nesting exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// Static-space dictionary index with no well-known entry.
    #[error("dictionary index 0x{index:02x} has no well-known entry")]
    DictionaryIndexOutOfRange { index: u32 },

    /// No envelope marker in the input.
    #[error("envelope marker not found in input")]
    EnvelopeMarkerNotFound,

    /// Declared in-band blob length inconsistent with the marker offset.
    #[error("in-band blob declares {declared} bytes but {actual} precede the envelope marker")]
    BlobLengthMismatch { declared: usize, actual: usize },

    /// In-band entry too long for the 1-byte length framing.
    #[error("in-band entry for index 0x{index:02x} is {len} bytes, over the 255-byte limit")]
    InbandEntryTooLong { index: u32, len: usize },

    /// Malformed or unterminated `[[value|ST_0xNN]]` reference.
    #[error("malformed string-table reference: {0}")]
    MalformedReference(String),

    /// Text longer than the record length fields can carry.
    #[error("text of {len} bytes exceeds the record length range")]
    OversizedText { len: usize },

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Byte offset associated with the failure, when the variant carries one.
    ///
    /// Lets a caller present a coarse "parse failure near offset N" message
    /// while the full variant stays available as the cause.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Common(e) => match e {
                veles_common::Error::TruncatedVarint { offset }
                | veles_common::Error::VarintOverflow { offset }
                | veles_common::Error::TruncatedString { offset, .. } => Some(*offset),
                _ => None,
            },
            Error::UnknownRecordType { offset, .. }
            | Error::TruncatedRecord { offset }
            | Error::UnexpectedEndElement { offset } => Some(*offset),
            _ => None,
        }
    }
}

/// Result type for binary XML operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Map a reader EOF to the record-level truncation error.
///
/// Varint and prefixed-string errors keep their own variants; only a plain
/// buffer exhaustion inside a record's fixed-size fields becomes
/// `TruncatedRecord`.
pub(crate) fn eof_to_truncated(e: veles_common::Error, offset: usize) -> Error {
    match e {
        veles_common::Error::UnexpectedEof { .. } => Error::TruncatedRecord { offset },
        other => Error::Common(other),
    }
}
