//! LZMA stream header parsing.
//!
//! A classic LZMA1 stream opens with a fixed 13-byte header:
//!
//! | Offset | Size | Field       |
//! |--------|------|-------------|
//! | 0      | 1    | properties byte, `((pb * 5) + lp) * 9 + lc` |
//! | 1      | 4    | dictionary size, little-endian u32          |
//! | 5      | 8    | uncompressed size, little-endian u64        |
//!
//! An uncompressed size of all-ones means the size is unknown and the
//! stream terminates with an explicit end-of-stream marker.

use oxilzma_core::error::{OxiLzmaError, Result};
use std::io::Read;

/// Smallest dictionary the decoder will operate with; declared sizes below
/// this are clamped up.
pub const DICT_SIZE_MIN: u32 = 4096;

/// Uncompressed-size sentinel meaning "unknown, wait for the end marker".
pub const UNPACK_SIZE_UNKNOWN: u64 = u64::MAX;

/// Default literal context bits.
pub const LC_DEFAULT: u32 = 3;
/// Default literal position bits.
pub const LP_DEFAULT: u32 = 0;
/// Default position bits.
pub const PB_DEFAULT: u32 = 2;

/// Upper bound on position states (`pb <= 4`).
pub const POS_STATES_MAX: usize = 1 << 4;

/// The (lc, lp, pb) triple from the properties byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaProperties {
    /// Literal context bits, 0..=8.
    pub lc: u32,
    /// Literal position bits, 0..=4.
    pub lp: u32,
    /// Position bits, 0..=4.
    pub pb: u32,
}

impl LzmaProperties {
    /// Create new properties.
    pub fn new(lc: u32, lp: u32, pb: u32) -> Self {
        Self { lc, lp, pb }
    }

    /// Decode the properties byte.
    ///
    /// Follows the canonical field packing: `pb = p / 45`,
    /// `lp = (p % 45) / 9`, `lc = (p % 45) % 9`.
    pub fn from_byte(byte: u8) -> Result<Self> {
        let p = u32::from(byte);
        let pb = p / 45;
        let lp = (p % 45) / 9;
        let lc = (p % 45) % 9;

        if lc > 8 || lp > 4 || pb > 4 {
            return Err(OxiLzmaError::invalid_properties(byte));
        }

        Ok(Self { lc, lp, pb })
    }

    /// Encode back into a properties byte.
    pub fn to_byte(self) -> u8 {
        (((self.pb * 5) + self.lp) * 9 + self.lc) as u8
    }

    /// Number of literal probability tables, `1 << (lc + lp)`.
    pub fn literal_table_count(self) -> usize {
        1 << (self.lc + self.lp)
    }

    /// Number of position states, `1 << pb`.
    pub fn pos_state_count(self) -> usize {
        1 << self.pb
    }

    /// Mask extracting the position state from the output byte counter.
    pub fn pos_state_mask(self) -> usize {
        self.pos_state_count() - 1
    }
}

impl Default for LzmaProperties {
    fn default() -> Self {
        Self {
            lc: LC_DEFAULT,
            lp: LP_DEFAULT,
            pb: PB_DEFAULT,
        }
    }
}

/// The fixed 13-byte stream header.
#[derive(Debug, Clone, Copy)]
pub struct LzmaHeader {
    /// Literal/match model parameters.
    pub props: LzmaProperties,
    /// Declared dictionary size, clamped up to [`DICT_SIZE_MIN`].
    pub dict_size: u32,
    /// Declared uncompressed size; `None` means unknown (end marker
    /// terminates the stream).
    pub unpack_size: Option<u64>,
}

impl LzmaHeader {
    /// Read and validate the header from the start of a stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut props_buf = [0u8; 1];
        reader
            .read_exact(&mut props_buf)
            .map_err(|_| OxiLzmaError::invalid_header("stream shorter than its header"))?;
        let props = LzmaProperties::from_byte(props_buf[0])?;

        let mut dict_buf = [0u8; 4];
        reader
            .read_exact(&mut dict_buf)
            .map_err(|_| OxiLzmaError::invalid_header("stream shorter than its header"))?;
        let dict_size = u32::from_le_bytes(dict_buf).max(DICT_SIZE_MIN);

        let mut size_buf = [0u8; 8];
        reader
            .read_exact(&mut size_buf)
            .map_err(|_| OxiLzmaError::invalid_header("stream shorter than its header"))?;
        let unpack_size = match u64::from_le_bytes(size_buf) {
            UNPACK_SIZE_UNKNOWN => None,
            size => Some(size),
        };

        Ok(Self {
            props,
            dict_size,
            unpack_size,
        })
    }
}
