//! Match distance decoding.

use crate::length::MATCH_LEN_MIN;
use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;
use std::io::Read;

/// Bits in a position-slot tree.
pub const DIST_SLOT_BITS: u32 = 6;

/// Length states keying the slot trees.
pub const LEN_STATES: usize = 4;

/// Bits in the align tree.
pub const ALIGN_BITS: u32 = 4;

/// First slot decoded with direct bits instead of the shared table.
pub const END_POS_MODEL_INDEX: u32 = 14;

/// Distances below this are fully modeled.
pub const FULL_DISTANCES: u32 = 1 << (END_POS_MODEL_INDEX >> 1);

/// Decoded distance value signalling end of stream.
pub const END_OF_STREAM: u32 = 0xFFFF_FFFF;

/// Slots in the shared mid-range table. Cell 0 is never addressed (tree
/// walks start at 1), hence the leading `1 +`.
const SPECIAL_SLOTS: usize = (1 + FULL_DISTANCES - END_POS_MODEL_INDEX) as usize;

/// Adaptive models for match distances.
///
/// A 6-bit slot keyed by the length state encodes the distance's magnitude
/// class. Slots 0..=3 are the distance itself; slots up to 13 add a
/// reverse-tree remainder from the shared table; larger slots add direct
/// bits and a 4-bit aligned remainder.
#[derive(Debug)]
pub struct DistanceDecoder {
    slot: [[Prob; 1 << DIST_SLOT_BITS]; LEN_STATES],
    special: [Prob; SPECIAL_SLOTS],
    align: [Prob; 1 << ALIGN_BITS],
}

impl DistanceDecoder {
    /// Fresh tables, all probabilities at the midpoint.
    pub fn new() -> Self {
        Self {
            slot: [[PROB_INIT; 1 << DIST_SLOT_BITS]; LEN_STATES],
            special: [PROB_INIT; SPECIAL_SLOTS],
            align: [PROB_INIT; 1 << ALIGN_BITS],
        }
    }

    /// Decode the distance for a match of length `len`.
    ///
    /// Returns the zero-based distance; [`END_OF_STREAM`] is the marker,
    /// not a real distance.
    pub fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>, len: u32) -> Result<u32> {
        let len_state = ((len - MATCH_LEN_MIN).min(LEN_STATES as u32 - 1)) as usize;
        let slot = rc.decode_bit_tree(&mut self.slot[len_state], DIST_SLOT_BITS)?;

        if slot < 4 {
            return Ok(slot);
        }

        let num_direct_bits = (slot >> 1) - 1;
        let mut dist = (2 | (slot & 1)) << num_direct_bits;

        if slot < END_POS_MODEL_INDEX {
            let base = (dist - slot) as usize;
            dist += rc.decode_bit_tree_reverse(&mut self.special[base..], num_direct_bits)?;
        } else {
            dist += rc.decode_direct_bits(num_direct_bits - ALIGN_BITS)? << ALIGN_BITS;
            dist += rc.decode_bit_tree_reverse(&mut self.align, ALIGN_BITS)?;
        }

        Ok(dist)
    }
}

impl Default for DistanceDecoder {
    fn default() -> Self {
        Self::new()
    }
}
