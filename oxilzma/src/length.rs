//! Match length decoding.

use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;
use std::io::Read;

/// Bits in the low length tree.
pub const LEN_LOW_BITS: u32 = 3;
/// Bits in the mid length tree.
pub const LEN_MID_BITS: u32 = 3;
/// Bits in the high length tree.
pub const LEN_HIGH_BITS: u32 = 8;

/// Shortest encodable match.
pub const MATCH_LEN_MIN: u32 = 2;
/// Longest encodable match.
pub const MATCH_LEN_MAX: u32 = MATCH_LEN_MIN
    + (1 << LEN_LOW_BITS)
    + (1 << LEN_MID_BITS)
    + (1 << LEN_HIGH_BITS)
    - 1;

/// Three-tier adaptive model for match lengths.
///
/// A choice bit selects the low tree (lengths 2..=9, per position state),
/// a second choice the mid tree (10..=17, per position state), otherwise
/// the shared high tree (18..=273). The top-level decoder keeps two
/// instances, one for simple matches and one for rep matches.
#[derive(Debug)]
pub struct LengthDecoder {
    choice: Prob,
    choice2: Prob,
    low: Vec<[Prob; 1 << LEN_LOW_BITS]>,
    mid: Vec<[Prob; 1 << LEN_MID_BITS]>,
    high: [Prob; 1 << LEN_HIGH_BITS],
}

impl LengthDecoder {
    /// Allocate trees for `pos_state_count` position states.
    pub fn new(pos_state_count: usize) -> Self {
        Self {
            choice: PROB_INIT,
            choice2: PROB_INIT,
            low: vec![[PROB_INIT; 1 << LEN_LOW_BITS]; pos_state_count],
            mid: vec![[PROB_INIT; 1 << LEN_MID_BITS]; pos_state_count],
            high: [PROB_INIT; 1 << LEN_HIGH_BITS],
        }
    }

    /// Decode a match length in `MATCH_LEN_MIN..=MATCH_LEN_MAX`.
    pub fn decode<R: Read>(
        &mut self,
        rc: &mut RangeDecoder<R>,
        pos_state: usize,
    ) -> Result<u32> {
        let code = if rc.decode_bit(&mut self.choice)? == 0 {
            rc.decode_bit_tree(&mut self.low[pos_state], LEN_LOW_BITS)?
        } else if rc.decode_bit(&mut self.choice2)? == 0 {
            (1 << LEN_LOW_BITS) + rc.decode_bit_tree(&mut self.mid[pos_state], LEN_MID_BITS)?
        } else {
            (1 << LEN_LOW_BITS)
                + (1 << LEN_MID_BITS)
                + rc.decode_bit_tree(&mut self.high, LEN_HIGH_BITS)?
        };
        Ok(MATCH_LEN_MIN + code)
    }
}
