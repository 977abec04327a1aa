//! # Hash Accumulator
//!
//! Per-stream projection vectors and the decayed fold that updates them.
//!
//! For every incoming chunk `c`, in shingle order, and every coordinate `i`:
//!
//! ```text
//! projection[i] = projection[i] * decay_rate + hash_i(c)
//! ```
//!
//! Outgoing chunks are then taken back out with `projection[i] -= hash_i(c)`.
//! The sign pattern of a projection is its [`Sketch`].

use crate::chunker::ChunkDiff;
use crate::hash::{ChunkHasher, HashKeyMatrix};
use serde::{Deserialize, Serialize};

// =============================================================================
// PROJECTION
// =============================================================================

/// The real-valued accumulator of one stream. Its width never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection(Vec<f64>);

impl Projection {
    /// A projection of `width` zeros.
    #[must_use]
    pub fn zeroed(width: usize) -> Self {
        Self(vec![0.0; width])
    }

    /// Wrap existing coordinates (e.g. restored from a snapshot).
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean norm of the coordinates.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Decay every coordinate once and add the chunk's contribution.
    pub fn fold_in<H: ChunkHasher>(
        &mut self,
        chunk: &[u8],
        keys: &HashKeyMatrix,
        hasher: &H,
        decay_rate: f64,
    ) {
        for (value, key) in self.0.iter_mut().zip(keys.rows()) {
            *value = *value * decay_rate + f64::from(hasher.hash_chunk(chunk, key));
        }
    }

    /// Subtract the chunk's contribution, without decay.
    pub fn take_out<H: ChunkHasher>(&mut self, chunk: &[u8], keys: &HashKeyMatrix, hasher: &H) {
        for (value, key) in self.0.iter_mut().zip(keys.rows()) {
            *value -= f64::from(hasher.hash_chunk(chunk, key));
        }
    }

    /// Apply a whole chunk diff: incoming chunks first, oldest first, then
    /// outgoing chunks. Returns the per-coordinate change.
    pub fn apply_diff<H: ChunkHasher>(
        &mut self,
        diff: &ChunkDiff,
        keys: &HashKeyMatrix,
        hasher: &H,
        decay_rate: f64,
    ) -> ProjectionDelta {
        let before = self.0.clone();
        for chunk in &diff.incoming {
            self.fold_in(chunk, keys, hasher, decay_rate);
        }
        for chunk in &diff.outgoing {
            self.take_out(chunk, keys, hasher);
        }
        ProjectionDelta(
            self.0
                .iter()
                .zip(&before)
                .map(|(after, before)| after - before)
                .collect(),
        )
    }
}

/// Per-coordinate change applied to a projection by one edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionDelta(Vec<f64>);

impl ProjectionDelta {
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// True if no coordinate moved.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

// =============================================================================
// SKETCH
// =============================================================================

/// The binary sketch of a projection: bit `i` is set iff `projection[i] >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    words: Vec<u64>,
    width: usize,
}

impl Sketch {
    #[must_use]
    pub fn from_projection(projection: &Projection) -> Self {
        let width = projection.width();
        let mut words = vec![0u64; width.div_ceil(64)];
        for (i, value) in projection.as_slice().iter().enumerate() {
            if *value >= 0.0 {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Self { words, width }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bit `i`, or `None` past the sketch width.
    #[must_use]
    pub fn bit(&self, i: usize) -> Option<bool> {
        (i < self.width).then(|| (self.words[i / 64] >> (i % 64)) & 1 == 1)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// The sketch as a string of `0`/`1`, coordinate 0 first.
    #[must_use]
    pub fn to_bit_string(&self) -> String {
        (0..self.width)
            .map(|i| if (self.words[i / 64] >> (i % 64)) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
