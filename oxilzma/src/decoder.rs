//! The top-level LZMA decode loop.
//!
//! Owns the probability tables that steer event dispatch, the sub-decoders
//! for literals, lengths and distances, the sliding output window, the
//! state-machine position and the rep-distance ring, and drives them until
//! the declared size is produced or the end-of-stream marker arrives.

use crate::distance::{DistanceDecoder, END_OF_STREAM};
use crate::header::{DICT_SIZE_MIN, LzmaHeader, LzmaProperties, POS_STATES_MAX};
use crate::length::LengthDecoder;
use crate::literal::LiteralDecoder;
use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use crate::state::{NUM_STATES, RepRing, State};
use oxilzma_core::error::{OxiLzmaError, Result};
use oxilzma_core::window::OutputWindow;
use std::io::Read;

/// Single-shot LZMA1 decoder.
///
/// All state is created for one decompression call and dropped on return;
/// nothing is shared or reused across calls.
pub struct LzmaDecoder<R: Read> {
    rc: RangeDecoder<R>,
    props: LzmaProperties,
    literals: LiteralDecoder,
    match_len: LengthDecoder,
    rep_len: LengthDecoder,
    distance: DistanceDecoder,
    is_match: [[Prob; POS_STATES_MAX]; NUM_STATES],
    is_rep: [Prob; NUM_STATES],
    is_rep_g0: [Prob; NUM_STATES],
    is_rep_g1: [Prob; NUM_STATES],
    is_rep_g2: [Prob; NUM_STATES],
    is_rep0_long: [[Prob; POS_STATES_MAX]; NUM_STATES],
    window: OutputWindow,
    state: State,
    reps: RepRing,
    unpack_size: Option<u64>,
}

impl<R: Read> LzmaDecoder<R> {
    /// Build a decoder over a headerless payload with explicit parameters.
    ///
    /// Consumes the five range-coder priming bytes from `reader`.
    pub fn new(
        reader: R,
        props: LzmaProperties,
        dict_size: u32,
        unpack_size: Option<u64>,
    ) -> Result<Self> {
        let dict_size = dict_size.max(DICT_SIZE_MIN) as usize;
        let output_hint = match unpack_size {
            // cap the pre-allocation; a hostile header may declare anything
            Some(size) => size.min(1 << 20) as usize,
            None => 0,
        };

        Ok(Self {
            rc: RangeDecoder::new(reader)?,
            literals: LiteralDecoder::new(props),
            match_len: LengthDecoder::new(props.pos_state_count()),
            rep_len: LengthDecoder::new(props.pos_state_count()),
            distance: DistanceDecoder::new(),
            is_match: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            is_rep: [PROB_INIT; NUM_STATES],
            is_rep_g0: [PROB_INIT; NUM_STATES],
            is_rep_g1: [PROB_INIT; NUM_STATES],
            is_rep_g2: [PROB_INIT; NUM_STATES],
            is_rep0_long: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            window: OutputWindow::with_output_capacity(dict_size, output_hint),
            state: State::new(),
            reps: RepRing::new(),
            props,
            unpack_size,
        })
    }

    /// Build a decoder from a stream opening with the 13-byte header.
    pub fn from_header(mut reader: R) -> Result<Self> {
        let header = LzmaHeader::read_from(&mut reader)?;
        Self::new(reader, header.props, header.dict_size, header.unpack_size)
    }

    /// Run the decode loop to completion and return the output.
    pub fn decompress(mut self) -> Result<Vec<u8>> {
        loop {
            // the corruption flag is sticky; surface it before anything
            // else, including the size-target check
            if self.rc.is_corrupted() {
                return Err(OxiLzmaError::range_corrupted(self.window.total_written()));
            }

            if let Some(size) = self.unpack_size {
                if self.window.total_written() >= size {
                    break;
                }
            }

            let pos_state = self.window.total_written() as usize & self.props.pos_state_mask();
            let state = self.state.value();

            if self.rc.decode_bit(&mut self.is_match[state][pos_state])? == 0 {
                self.decode_literal()?;
                self.state.update_literal();
            } else if self.rc.decode_bit(&mut self.is_rep[state])? == 0 {
                let len = self.match_len.decode(&mut self.rc, pos_state)?;
                let dist = self.distance.decode(&mut self.rc, len)?;

                if dist == END_OF_STREAM {
                    return self.finish_at_marker();
                }

                self.reps.push(dist);
                self.copy_match(dist, len)?;
                self.state.update_match();
            } else if self.rc.decode_bit(&mut self.is_rep_g0[state])? == 0 {
                if self.rc.decode_bit(&mut self.is_rep0_long[state][pos_state])? == 0 {
                    // short rep: a single byte from the last-used distance
                    let byte = self.window.read_back(self.reps.rep0() as usize + 1)?;
                    self.window.push(byte);
                    self.state.update_short_rep();
                } else {
                    let len = self.rep_len.decode(&mut self.rc, pos_state)?;
                    self.copy_match(self.reps.rep0(), len)?;
                    self.state.update_long_rep();
                }
            } else {
                let index = if self.rc.decode_bit(&mut self.is_rep_g1[state])? == 0 {
                    1
                } else if self.rc.decode_bit(&mut self.is_rep_g2[state])? == 0 {
                    2
                } else {
                    3
                };
                let dist = self.reps.promote(index);
                let len = self.rep_len.decode(&mut self.rc, pos_state)?;
                self.copy_match(dist, len)?;
                self.state.update_long_rep();
            }
        }

        Ok(self.window.into_output())
    }

    fn decode_literal(&mut self) -> Result<()> {
        let prev_byte = self.window.last_byte().unwrap_or(0);
        let match_byte = if self.state.is_literal() {
            None
        } else {
            Some(self.window.read_back(self.reps.rep0() as usize + 1)?)
        };

        let byte = self.literals.decode(
            &mut self.rc,
            self.window.total_written(),
            prev_byte,
            match_byte,
        )?;
        self.window.push(byte);
        Ok(())
    }

    /// Copy `len` bytes from `dist` (zero-based), guarding the declared
    /// size: a match may not demand more output than the header promised.
    fn copy_match(&mut self, dist: u32, len: u32) -> Result<()> {
        if let Some(size) = self.unpack_size {
            let remaining = size - self.window.total_written();
            if u64::from(len) > remaining {
                return Err(OxiLzmaError::size_mismatch(
                    size,
                    self.window.total_written() + u64::from(len),
                ));
            }
        }
        self.window.copy_match(dist as usize + 1, len as usize)
    }

    /// Terminate on the end-of-stream marker.
    ///
    /// Only a stream of unknown size may end here; the coder must be clean
    /// and fully drained.
    fn finish_at_marker(self) -> Result<Vec<u8>> {
        if let Some(size) = self.unpack_size {
            if self.window.total_written() != size {
                return Err(OxiLzmaError::size_mismatch(size, self.window.total_written()));
            }
        }
        if self.rc.is_corrupted() {
            return Err(OxiLzmaError::range_corrupted(self.window.total_written()));
        }
        if !self.rc.is_finished_ok() {
            return Err(OxiLzmaError::trailing_data(self.rc.code()));
        }
        Ok(self.window.into_output())
    }
}

/// Decompress a stream opening with the 13-byte header.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    LzmaDecoder::from_header(reader)?.decompress()
}

/// Decompress a headerless payload with explicit parameters.
pub fn decompress_raw<R: Read>(
    reader: R,
    props: LzmaProperties,
    dict_size: u32,
    unpack_size: Option<u64>,
) -> Result<Vec<u8>> {
    LzmaDecoder::new(reader, props, dict_size, unpack_size)?.decompress()
}
