// src/acquisition/ring_buffer.rs
//! Overwrite-on-full circular store for raw EEG samples
//!
//! Single producer, single consumer. A push into a full buffer advances the
//! read index and silently drops the oldest sample, so the buffer always
//! holds the most recent `capacity` samples and the producer never blocks.
//! Resource exhaustion here is policy, not an error.

use crate::hal::types::EegSample;

/// Fixed-capacity circular sample store with drop-oldest overflow policy
pub struct SampleRingBuffer {
    samples: Vec<EegSample>,
    capacity: usize,
    write_index: usize,
    read_index: usize,
    full: bool,
}

impl SampleRingBuffer {
    /// Create a buffer holding up to `capacity` samples
    ///
    /// # Panics
    /// Panics if `capacity` is zero; configuration validation rejects that
    /// before construction.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            samples: vec![
                EegSample {
                    left: 0,
                    right: 0,
                    timestamp_us: 0
                };
                capacity
            ],
            capacity,
            write_index: 0,
            read_index: 0,
            full: false,
        }
    }

    /// Store one sample, dropping the oldest if the buffer has wrapped
    pub fn push(&mut self, sample: EegSample) {
        self.samples[self.write_index] = sample;
        self.write_index = (self.write_index + 1) % self.capacity;

        if self.write_index == self.read_index {
            self.full = true;
            self.read_index = (self.read_index + 1) % self.capacity;
        }
    }

    /// Copy out the oldest unread sample, if any
    pub fn pop(&mut self) -> Option<EegSample> {
        if self.is_empty() {
            return None;
        }
        let sample = self.samples[self.read_index];
        self.read_index = (self.read_index + 1) % self.capacity;
        self.full = false;
        Some(sample)
    }

    /// Number of unread samples
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity
        } else if self.write_index >= self.read_index {
            self.write_index - self.read_index
        } else {
            self.capacity - self.read_index + self.write_index
        }
    }

    /// True when no unread samples remain
    pub fn is_empty(&self) -> bool {
        !self.full && self.write_index == self.read_index
    }

    /// True when the buffer has wrapped without being drained
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index the next pop will read from
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Copy of the unread samples, oldest first, without consuming them
    pub fn snapshot(&self) -> Vec<EegSample> {
        let mut out = Vec::with_capacity(self.len());
        let mut idx = self.read_index;
        for _ in 0..self.len() {
            out.push(self.samples[idx]);
            idx = (idx + 1) % self.capacity;
        }
        out
    }
}
