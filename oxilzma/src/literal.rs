//! Literal byte decoding.

use crate::header::LzmaProperties;
use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;
use std::io::Read;

/// Slots per literal table: 0x100 for the straight walk plus 2 * 0x100 for
/// the match-byte-guided walk.
const LITERAL_TABLE_SIZE: usize = 0x300;

/// Adaptive models for literal bytes.
///
/// One table per (position, previous byte) context; the stream's `lp` and
/// `lc` parameters decide how much of each feeds the table index.
#[derive(Debug)]
pub struct LiteralDecoder {
    probs: Vec<[Prob; LITERAL_TABLE_SIZE]>,
    lc: u32,
    lp: u32,
}

impl LiteralDecoder {
    /// Allocate the `1 << (lc + lp)` tables for the given properties.
    pub fn new(props: LzmaProperties) -> Self {
        Self {
            probs: vec![[PROB_INIT; LITERAL_TABLE_SIZE]; props.literal_table_count()],
            lc: props.lc,
            lp: props.lp,
        }
    }

    /// Decode one literal byte.
    ///
    /// `match_byte` carries the dictionary byte at the last-used distance
    /// when the previous emission was a match; its bits steer the walk
    /// until the first divergence, after which decoding falls back to the
    /// straight path.
    pub fn decode<R: Read>(
        &mut self,
        rc: &mut RangeDecoder<R>,
        total_written: u64,
        prev_byte: u8,
        match_byte: Option<u8>,
    ) -> Result<u8> {
        let table = &mut self.probs[table_index(self.lc, self.lp, total_written, prev_byte)];
        let mut symbol = 1usize;

        if let Some(byte) = match_byte {
            let mut match_byte = usize::from(byte);
            while symbol < 0x100 {
                let match_bit = (match_byte >> 7) & 1;
                match_byte <<= 1;
                let bit = rc.decode_bit(&mut table[((1 + match_bit) << 8) + symbol])? as usize;
                symbol = (symbol << 1) | bit;
                if bit != match_bit {
                    break;
                }
            }
        }

        while symbol < 0x100 {
            let bit = rc.decode_bit(&mut table[symbol])? as usize;
            symbol = (symbol << 1) | bit;
        }

        Ok((symbol & 0xFF) as u8)
    }
}

fn table_index(lc: u32, lp: u32, total_written: u64, prev_byte: u8) -> usize {
    let pos_part = (total_written & ((1 << lp) - 1)) as usize;
    let byte_part = usize::from(prev_byte) >> (8 - lc);
    (pos_part << lc) | byte_part
}
