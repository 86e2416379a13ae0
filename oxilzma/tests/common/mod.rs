//! Event-level LZMA stream builder for the decoder tests.
//!
//! Mirrors the decoder's probability layout and range arithmetic, but
//! encodes only explicitly scripted events (no match finding), so tests
//! can fabricate bit-exact reference streams and know the expected output
//! ahead of time. Kept out of the library on purpose: compression is not
//! part of the crate's surface.

#![allow(dead_code)]

const PROB_BITS: u32 = 11;
const PROB_INIT: u16 = 1 << (PROB_BITS - 1);
const PROB_MAX: u16 = 1 << PROB_BITS;
const MOVE_BITS: u32 = 5;
const TOP_VALUE: u32 = 1 << 24;

/// Range encoder with the standard shift-low carry scheme.
pub struct RangeEncoder {
    out: Vec<u8>,
    low: u64,
    range: u32,
    cache: u8,
    cache_size: u64,
}

impl RangeEncoder {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            low: 0,
            range: 0xFFFF_FFFF,
            cache: 0,
            cache_size: 1,
        }
    }

    fn shift_low(&mut self) {
        if self.low < 0xFF00_0000 || self.low > 0xFFFF_FFFF {
            let mut tmp = self.cache;
            let carry = (self.low >> 32) as u8;
            loop {
                self.out.push(tmp.wrapping_add(carry));
                tmp = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = (self.low << 8) & 0xFFFF_FFFF;
    }

    fn normalize(&mut self) {
        if self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low();
        }
    }

    fn encode_bit(&mut self, prob: &mut u16, bit: u32) {
        let bound = (self.range >> PROB_BITS) * u32::from(*prob);
        if bit == 0 {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
        } else {
            self.low += u64::from(bound);
            self.range -= bound;
            *prob -= *prob >> MOVE_BITS;
        }
        self.normalize();
    }

    fn encode_direct_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.range >>= 1;
            if (value >> i) & 1 != 0 {
                self.low += u64::from(self.range);
            }
            self.normalize();
        }
    }

    fn finish(mut self) -> Vec<u8> {
        for _ in 0..5 {
            self.shift_low();
        }
        self.out
    }
}

fn encode_tree(rc: &mut RangeEncoder, probs: &mut [u16], num_bits: u32, symbol: u32) {
    let mut m = 1usize;
    for i in (0..num_bits).rev() {
        let bit = (symbol >> i) & 1;
        rc.encode_bit(&mut probs[m], bit);
        m = (m << 1) | bit as usize;
    }
}

fn encode_tree_reverse(rc: &mut RangeEncoder, probs: &mut [u16], num_bits: u32, symbol: u32) {
    let mut m = 1usize;
    for i in 0..num_bits {
        let bit = (symbol >> i) & 1;
        rc.encode_bit(&mut probs[m], bit);
        m = (m << 1) | bit as usize;
    }
}

struct LenEncoder {
    choice: u16,
    choice2: u16,
    low: Vec<[u16; 8]>,
    mid: Vec<[u16; 8]>,
    high: [u16; 256],
}

impl LenEncoder {
    fn new(pos_state_count: usize) -> Self {
        Self {
            choice: PROB_INIT,
            choice2: PROB_INIT,
            low: vec![[PROB_INIT; 8]; pos_state_count],
            mid: vec![[PROB_INIT; 8]; pos_state_count],
            high: [PROB_INIT; 256],
        }
    }

    fn encode(&mut self, rc: &mut RangeEncoder, len: u32, pos_state: usize) {
        assert!((2..=273).contains(&len), "unencodable length {len}");
        let code = len - 2;
        if code < 8 {
            rc.encode_bit(&mut self.choice, 0);
            encode_tree(rc, &mut self.low[pos_state], 3, code);
        } else if code < 16 {
            rc.encode_bit(&mut self.choice, 1);
            rc.encode_bit(&mut self.choice2, 0);
            encode_tree(rc, &mut self.mid[pos_state], 3, code - 8);
        } else {
            rc.encode_bit(&mut self.choice, 1);
            rc.encode_bit(&mut self.choice2, 1);
            encode_tree(rc, &mut self.high, 8, code - 16);
        }
    }
}

fn dist_slot(dist: u32) -> u32 {
    if dist < 4 {
        dist
    } else {
        let top = 31 - dist.leading_zeros();
        (top << 1) | ((dist >> (top - 1)) & 1)
    }
}

/// Scripted-event LZMA1 encoder.
///
/// Distances are zero-based, like the decoder's rep ring: `dist = 0` is a
/// copy from one byte back. `history()` is the byte sequence a correct
/// decoder must reproduce.
pub struct StreamEncoder {
    rc: RangeEncoder,
    lc: u32,
    lp: u32,
    pb: u32,
    is_match: [[u16; 16]; 12],
    is_rep: [u16; 12],
    is_rep_g0: [u16; 12],
    is_rep_g1: [u16; 12],
    is_rep_g2: [u16; 12],
    is_rep0_long: [[u16; 16]; 12],
    literal: Vec<[u16; 0x300]>,
    match_len: LenEncoder,
    rep_len: LenEncoder,
    dist_slot: [[u16; 64]; 4],
    dist_special: [u16; 115],
    dist_align: [u16; 16],
    state: usize,
    reps: [u32; 4],
    history: Vec<u8>,
}

impl StreamEncoder {
    pub fn new(lc: u32, lp: u32, pb: u32) -> Self {
        let pos_state_count = 1usize << pb;
        Self {
            rc: RangeEncoder::new(),
            lc,
            lp,
            pb,
            is_match: [[PROB_INIT; 16]; 12],
            is_rep: [PROB_INIT; 12],
            is_rep_g0: [PROB_INIT; 12],
            is_rep_g1: [PROB_INIT; 12],
            is_rep_g2: [PROB_INIT; 12],
            is_rep0_long: [[PROB_INIT; 16]; 12],
            literal: vec![[PROB_INIT; 0x300]; 1 << (lc + lp)],
            match_len: LenEncoder::new(pos_state_count),
            rep_len: LenEncoder::new(pos_state_count),
            dist_slot: [[PROB_INIT; 64]; 4],
            dist_special: [PROB_INIT; 115],
            dist_align: [PROB_INIT; 16],
            state: 0,
            reps: [0; 4],
            history: Vec::new(),
        }
    }

    /// Encoder with the ubiquitous (lc=3, lp=0, pb=2) parameters.
    pub fn with_default_props() -> Self {
        Self::new(3, 0, 2)
    }

    /// Bytes a correct decode of the scripted events must produce.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    fn pos_state(&self) -> usize {
        self.history.len() & ((1 << self.pb) - 1)
    }

    /// Script one literal byte.
    pub fn literal(&mut self, byte: u8) {
        let ps = self.pos_state();
        self.rc.encode_bit(&mut self.is_match[self.state][ps], 0);

        let prev = self.history.last().copied().unwrap_or(0);
        let idx = ((self.history.len() & ((1 << self.lp) - 1)) << self.lc)
            | (usize::from(prev) >> (8 - self.lc));
        let table = &mut self.literal[idx];
        let mut symbol = 1usize;

        if self.state < 7 {
            for i in (0..8).rev() {
                let bit = u32::from((byte >> i) & 1);
                self.rc.encode_bit(&mut table[symbol], bit);
                symbol = (symbol << 1) | bit as usize;
            }
        } else {
            let back = self.reps[0] as usize + 1;
            let mut match_byte = usize::from(self.history[self.history.len() - back]);
            let mut diverged = false;
            for i in (0..8).rev() {
                let bit = u32::from((byte >> i) & 1);
                if diverged {
                    self.rc.encode_bit(&mut table[symbol], bit);
                } else {
                    let match_bit = (match_byte >> 7) & 1;
                    match_byte <<= 1;
                    self.rc
                        .encode_bit(&mut table[((1 + match_bit) << 8) + symbol], bit);
                    if bit as usize != match_bit {
                        diverged = true;
                    }
                }
                symbol = (symbol << 1) | bit as usize;
            }
        }

        self.state = if self.state < 4 {
            0
        } else if self.state < 10 {
            self.state - 3
        } else {
            self.state - 6
        };
        self.history.push(byte);
    }

    /// Script a simple match. `dist` is zero-based and must point into the
    /// scripted history.
    pub fn simple_match(&mut self, dist: u32, len: u32) {
        assert!(
            (dist as usize) < self.history.len(),
            "match reaches before the scripted history"
        );
        self.encode_match_event(dist, len);
        self.reps.rotate_right(1);
        self.reps[0] = dist;
        self.state = if self.state < 7 { 7 } else { 10 };
        self.copy_into_history(dist, len);
    }

    /// Script a match event without touching the scripted history; for
    /// building intentionally invalid streams.
    pub fn raw_match(&mut self, dist: u32, len: u32) {
        self.encode_match_event(dist, len);
    }

    /// Script a rep match. `index` 0..=3 picks the rep-ring entry.
    pub fn rep_match(&mut self, index: usize, len: u32) {
        let ps = self.pos_state();
        self.rc.encode_bit(&mut self.is_match[self.state][ps], 1);
        self.rc.encode_bit(&mut self.is_rep[self.state], 1);
        if index == 0 {
            self.rc.encode_bit(&mut self.is_rep_g0[self.state], 0);
            self.rc
                .encode_bit(&mut self.is_rep0_long[self.state][ps], 1);
        } else {
            self.rc.encode_bit(&mut self.is_rep_g0[self.state], 1);
            if index == 1 {
                self.rc.encode_bit(&mut self.is_rep_g1[self.state], 0);
            } else {
                self.rc.encode_bit(&mut self.is_rep_g1[self.state], 1);
                let bit = u32::from(index == 3);
                self.rc.encode_bit(&mut self.is_rep_g2[self.state], bit);
            }
            self.reps[..=index].rotate_right(1);
        }
        let dist = self.reps[0];
        self.rep_len.encode(&mut self.rc, len, ps);
        self.state = if self.state < 7 { 8 } else { 11 };
        self.copy_into_history(dist, len);
    }

    /// Script a one-byte match from the last-used distance.
    pub fn short_rep(&mut self) {
        let ps = self.pos_state();
        self.rc.encode_bit(&mut self.is_match[self.state][ps], 1);
        self.rc.encode_bit(&mut self.is_rep[self.state], 1);
        self.rc.encode_bit(&mut self.is_rep_g0[self.state], 0);
        self.rc
            .encode_bit(&mut self.is_rep0_long[self.state][ps], 0);
        let back = self.reps[0] as usize + 1;
        let byte = self.history[self.history.len() - back];
        self.state = if self.state < 7 { 9 } else { 11 };
        self.history.push(byte);
    }

    /// Script the end-of-stream marker.
    pub fn end_marker(&mut self) {
        self.encode_match_event(0xFFFF_FFFF, 2);
    }

    /// Flush the coder and prepend the 13-byte header.
    pub fn finish(self, dict_size: u32, unpack_size: Option<u64>) -> Vec<u8> {
        let props = (((self.pb * 5) + self.lp) * 9 + self.lc) as u8;
        let mut data = vec![props];
        data.extend_from_slice(&dict_size.to_le_bytes());
        data.extend_from_slice(&unpack_size.unwrap_or(u64::MAX).to_le_bytes());
        data.extend_from_slice(&self.rc.finish());
        data
    }

    /// Flush the coder and return the headerless payload.
    pub fn finish_raw(self) -> Vec<u8> {
        self.rc.finish()
    }

    fn encode_match_event(&mut self, dist: u32, len: u32) {
        let ps = self.pos_state();
        self.rc.encode_bit(&mut self.is_match[self.state][ps], 1);
        self.rc.encode_bit(&mut self.is_rep[self.state], 0);
        self.match_len.encode(&mut self.rc, len, ps);

        let len_state = ((len - 2).min(3)) as usize;
        let slot = dist_slot(dist);
        encode_tree(&mut self.rc, &mut self.dist_slot[len_state], 6, slot);
        if slot >= 4 {
            let num_direct_bits = (slot >> 1) - 1;
            let base = (2 | (slot & 1)) << num_direct_bits;
            let rem = dist - base;
            if slot < 14 {
                let offset = (base - slot) as usize;
                encode_tree_reverse(
                    &mut self.rc,
                    &mut self.dist_special[offset..],
                    num_direct_bits,
                    rem,
                );
            } else {
                self.rc.encode_direct_bits(rem >> 4, num_direct_bits - 4);
                encode_tree_reverse(&mut self.rc, &mut self.dist_align, 4, rem & 0xF);
            }
        }
    }

    fn copy_into_history(&mut self, dist: u32, len: u32) {
        let back = dist as usize + 1;
        for _ in 0..len {
            let byte = self.history[self.history.len() - back];
            self.history.push(byte);
        }
    }
}
