//! Error types for veles-common.

use thiserror::Error;

/// Common error type for Veles operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Buffer ended in the middle of a multi-byte integer.
    #[error("truncated multi-byte integer at offset {offset}")]
    TruncatedVarint { offset: usize },

    /// Multi-byte integer exceeds the 31-bit value range.
    #[error("multi-byte integer at offset {offset} exceeds the 31-bit range")]
    VarintOverflow { offset: usize },

    /// Buffer ended before a length-prefixed string's declared end.
    #[error(
        "truncated string at offset {offset}: declared {declared} bytes but only {available} available"
    )]
    TruncatedString {
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// Invalid GUID format.
    #[error("invalid GUID format: {0}")]
    InvalidGuid(String),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
