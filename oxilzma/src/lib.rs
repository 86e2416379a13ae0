//! # OxiLzma
//!
//! Single-shot decoder for the classic LZMA1 stream format (the raw
//! range-coded stream produced by LZMA1 encoders, not the `.xz` or LZMA2
//! container variants).
//!
//! ## Stream layout
//!
//! 1. Properties byte (lc, lp, pb packed as `((pb * 5) + lp) * 9 + lc`)
//! 2. Dictionary size (4 bytes, little-endian)
//! 3. Uncompressed size (8 bytes, little-endian; all-ones = unknown)
//! 4. Range-coded payload (one 0x00 priming byte, four big-endian code
//!    bytes, then the coded stream)
//!
//! ## Usage
//!
//! ```ignore
//! use oxilzma::decompress_bytes;
//!
//! let compressed = std::fs::read("data.lzma")?;
//! let decompressed = decompress_bytes(&compressed)?;
//! ```
//!
//! The decoder consumes a fully materialized input and produces a fully
//! materialized output in one call; there is no streaming surface.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod distance;
pub mod header;
pub mod length;
pub mod literal;
pub mod range_coder;
pub mod state;

// Re-exports
pub use decoder::{LzmaDecoder, decompress, decompress_raw};
pub use header::{DICT_SIZE_MIN, LzmaHeader, LzmaProperties};
pub use range_coder::RangeDecoder;
pub use state::State;

use oxilzma_core::error::Result;

/// Decompress an LZMA stream held in a byte slice.
///
/// This is the one-call surface over [`decompress`]: the slice must open
/// with the 13-byte header.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Cursor;
    decompress(Cursor::new(data))
}
