//! # Sketch Configuration
//!
//! Run-wide parameters of the engine. They are fixed for the lifetime of a
//! run and validated once, before the first edge is applied.

use crate::primitives::{
    DEFAULT_CHUNK_LENGTH, DEFAULT_DECAY_RATE, DEFAULT_KEY_SEED, DEFAULT_SKETCH_WIDTH,
    MAX_CHUNK_LENGTH, MAX_SKETCH_WIDTH, MIN_CHUNK_LENGTH,
};
use crate::StreamHashError;
use serde::{Deserialize, Serialize};

/// How superseded chunks are treated when a node's shingle grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkPolicy {
    /// Fold every chunk whose content changed and subtract the hash of the
    /// partial chunk it replaced.
    #[default]
    Symmetric,
    /// Fold only the current last chunk and never subtract anything.
    AddOnly,
}

/// Parameters shared by every stream of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SketchConfig {
    /// Width of a shingle chunk, in bytes.
    pub chunk_length: usize,
    /// Number of hash functions, i.e. projection and sketch width (`L`).
    pub sketch_width: usize,
    /// Factor applied to the projection before each chunk is folded in.
    pub decay_rate: f64,
    /// Seed the hash key matrix is derived from.
    pub seed: u64,
    /// Treatment of superseded chunks.
    pub policy: ChunkPolicy,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            chunk_length: DEFAULT_CHUNK_LENGTH,
            sketch_width: DEFAULT_SKETCH_WIDTH,
            decay_rate: DEFAULT_DECAY_RATE,
            seed: DEFAULT_KEY_SEED,
            policy: ChunkPolicy::default(),
        }
    }
}

impl SketchConfig {
    /// Validate the configuration.
    ///
    /// A configuration is valid if:
    /// - `chunk_length` can hold the shingle head (filler + source type)
    /// - `sketch_width` is non-zero
    /// - `decay_rate` is a finite value strictly between 0 and 1
    ///
    /// Returns `StreamHashError::InvalidConfig` otherwise.
    pub fn validate(&self) -> Result<(), StreamHashError> {
        if self.chunk_length < MIN_CHUNK_LENGTH {
            return Err(StreamHashError::InvalidConfig(format!(
                "chunk_length must be at least {}, got {}",
                MIN_CHUNK_LENGTH, self.chunk_length
            )));
        }
        if self.chunk_length > MAX_CHUNK_LENGTH {
            return Err(StreamHashError::InvalidConfig(format!(
                "chunk_length must be at most {}, got {}",
                MAX_CHUNK_LENGTH, self.chunk_length
            )));
        }
        if self.sketch_width == 0 || self.sketch_width > MAX_SKETCH_WIDTH {
            return Err(StreamHashError::InvalidConfig(format!(
                "sketch_width must be in 1..={}, got {}",
                MAX_SKETCH_WIDTH, self.sketch_width
            )));
        }
        if !self.decay_rate.is_finite() || self.decay_rate <= 0.0 || self.decay_rate >= 1.0 {
            return Err(StreamHashError::InvalidConfig(format!(
                "decay_rate must lie strictly between 0 and 1, got {}",
                self.decay_rate
            )));
        }
        Ok(())
    }

    /// Builder-style override of the chunk width.
    #[must_use]
    pub fn with_chunk_length(mut self, chunk_length: usize) -> Self {
        self.chunk_length = chunk_length;
        self
    }

    /// Builder-style override of the sketch width.
    #[must_use]
    pub fn with_sketch_width(mut self, sketch_width: usize) -> Self {
        self.sketch_width = sketch_width;
        self
    }

    /// Builder-style override of the decay rate.
    #[must_use]
    pub fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    /// Builder-style override of the key seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder-style override of the chunk policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ChunkPolicy) -> Self {
        self.policy = policy;
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
