//! Bounded sample ring buffer.
//!
//! Implements a fixed-size circular buffer for windowed trace samples.
//! Follows NASA Power of 10: bounded resources, no dynamic allocation in hot path.

/// A fixed-capacity ring of samples, zero-filled at creation.
///
/// The ring is always full: pushing a value evicts the oldest one. Indexing
/// is logical, with index 0 the oldest sample and `len() - 1` the newest.
#[derive(Debug, Clone)]
pub struct SampleRing {
    /// Backing storage, never resized after construction
    buf: Vec<f64>,
    /// Physical index of the oldest sample
    head: usize,
}

impl SampleRing {
    /// Create a new ring with the specified capacity, filled with zeros.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");

        Self {
            buf: vec![0.0; capacity],
            head: 0,
        }
    }

    /// Append a sample, evicting the oldest (FIFO).
    pub fn push(&mut self, value: f64) {
        // The oldest slot becomes the newest
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();

        // NASA Power of 10: assert postcondition
        debug_assert!(self.head < self.buf.len());
    }

    /// Sample at logical position `index` (0 = oldest).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.buf.len() {
            return None;
        }
        Some(self.buf[(self.head + index) % self.buf.len()])
    }

    /// Most recently pushed sample.
    #[must_use]
    pub fn latest(&self) -> f64 {
        let n = self.buf.len();
        self.buf[(self.head + n - 1) % n]
    }

    /// Fixed capacity of the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always `false`; a ring holds at least one slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Iterate samples oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Copy samples oldest to newest into a fresh vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
