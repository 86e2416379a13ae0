//! Sliding output window for LZMA back-reference resolution.
//!
//! The decoder emits into a circular dictionary of `dict_size` bytes that
//! doubles as the source for match copies, while the full decoded stream
//! accumulates in a linear output buffer. Both live in one type because
//! every byte that enters the window also belongs to the output.

use crate::error::{OxiLzmaError, Result};

/// Circular dictionary fused with the linear output accumulator.
///
/// The window always reflects the last `min(total_written, capacity)`
/// emitted bytes. Reads at distance `d` (1-based, `d == 1` is the most
/// recent byte) are valid exactly when `d` does not exceed that span.
///
/// LZMA dictionary sizes are arbitrary 32-bit values, so wrapping is done
/// by index arithmetic rather than a power-of-two mask.
#[derive(Debug)]
pub struct OutputWindow {
    /// The circular dictionary.
    buffer: Vec<u8>,
    /// Next write position in the dictionary.
    position: usize,
    /// Bytes of valid history, up to `capacity`.
    size: usize,
    /// Dictionary capacity.
    capacity: usize,
    /// Accumulated decoded output.
    output: Vec<u8>,
}

impl OutputWindow {
    /// Create a window with the given dictionary capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be greater than 0");
        Self {
            buffer: vec![0; capacity],
            position: 0,
            size: 0,
            capacity,
            output: Vec::new(),
        }
    }

    /// Create a window with an output capacity hint.
    pub fn with_output_capacity(capacity: usize, output_capacity: usize) -> Self {
        let mut window = Self::new(capacity);
        window.output = Vec::with_capacity(output_capacity);
        window
    }

    /// Dictionary capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes of history currently available, `min(total_written, capacity)`.
    pub fn history_len(&self) -> usize {
        self.size
    }

    /// Total bytes emitted so far.
    pub fn total_written(&self) -> u64 {
        self.output.len() as u64
    }

    /// The most recently emitted byte, if any.
    pub fn last_byte(&self) -> Option<u8> {
        if self.size == 0 {
            None
        } else {
            Some(self.buffer[self.back_index(1)])
        }
    }

    /// Emit one byte.
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position += 1;
        if self.position == self.capacity {
            self.position = 0;
        }
        if self.size < self.capacity {
            self.size += 1;
        }
        self.output.push(byte);
    }

    /// Read the byte emitted `distance` positions ago.
    ///
    /// `distance == 1` is the most recent byte. Fails if `distance` is zero
    /// or exceeds the available history.
    pub fn read_back(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.size {
            return Err(OxiLzmaError::invalid_distance(distance, self.size));
        }
        Ok(self.buffer[self.back_index(distance)])
    }

    /// Copy `length` bytes from `distance` back, re-emitting them.
    ///
    /// Overlapping copies (`length > distance`) are valid and observe the
    /// bytes written earlier in the same copy, so the copy proceeds
    /// byte-by-byte.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.size {
            return Err(OxiLzmaError::invalid_distance(distance, self.size));
        }
        self.output.reserve(length);
        for _ in 0..length {
            let byte = self.buffer[self.back_index(distance)];
            self.push(byte);
        }
        Ok(())
    }

    /// The accumulated output.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the window and return the accumulated output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    fn back_index(&self, distance: usize) -> usize {
        if self.position >= distance {
            self.position - distance
        } else {
            self.capacity - (distance - self.position)
        }
    }
}
