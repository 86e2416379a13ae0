//! Error types for OxiLzma operations.
//!
//! Every failure mode of a decode maps to one variant here. All errors are
//! fatal to the decode in progress; none are retried.

use std::io;
use thiserror::Error;

/// The main error type for OxiLzma operations.
#[derive(Debug, Error)]
pub enum OxiLzmaError {
    /// I/O error from the underlying reader, including running out of
    /// input mid-stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The properties byte does not encode a valid (lc, lp, pb) triple.
    #[error("invalid properties byte {byte:#04x}")]
    InvalidProperties {
        /// The offending properties byte.
        byte: u8,
    },

    /// Malformed or truncated stream header.
    #[error("invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The range-coder priming byte (stream offset 13) was not zero.
    #[error("range coder priming byte must be 0x00, found {byte:#04x}")]
    NonZeroPrimer {
        /// The byte found where 0x00 was required.
        byte: u8,
    },

    /// The range coder entered a degenerate state.
    #[error("range coder corrupted after {position} output bytes")]
    RangeCoderCorrupted {
        /// Number of bytes decoded when corruption was observed.
        position: u64,
    },

    /// A back-reference pointed outside the bytes the window holds.
    #[error("invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes of history currently available.
        history_size: usize,
    },

    /// The stream disagrees with its declared uncompressed size.
    #[error("declared uncompressed size is {expected} bytes, stream yields {actual}")]
    SizeMismatch {
        /// Size declared in the header.
        expected: u64,
        /// Size the stream actually demanded or produced.
        actual: u64,
    },

    /// The range coder did not drain to zero after the end-of-stream
    /// marker.
    #[error("non-zero range coder state {code:#010x} after end-of-stream marker")]
    TrailingData {
        /// Remaining `code` register value.
        code: u32,
    },
}

/// Result type alias for OxiLzma operations.
pub type Result<T> = std::result::Result<T, OxiLzmaError>;

impl OxiLzmaError {
    /// Create an invalid properties error.
    pub fn invalid_properties(byte: u8) -> Self {
        Self::InvalidProperties { byte }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a non-zero primer error.
    pub fn non_zero_primer(byte: u8) -> Self {
        Self::NonZeroPrimer { byte }
    }

    /// Create a range coder corruption error.
    pub fn range_corrupted(position: u64) -> Self {
        Self::RangeCoderCorrupted { position }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create a trailing data error.
    pub fn trailing_data(code: u32) -> Self {
        Self::TrailingData { code }
    }
}
