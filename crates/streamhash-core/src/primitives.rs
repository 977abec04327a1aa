//! # Primitives
//!
//! Compiled-in constants for the streamhash engine.
//!
//! Runtime parameters (chunk width, sketch width, decay) live in
//! [`SketchConfig`](crate::config::SketchConfig); the values here are
//! either their defaults or fixed parts of the shingle and file formats.

/// Byte that marks the start of every shingle.
///
/// A shingle is `SHINGLE_HEAD_FILLER, source_type, e1, d1, e2, d2, ...`,
/// so its length is always `2 * (n + 1)` for `n` outgoing edges.
pub const SHINGLE_HEAD_FILLER: u8 = b' ';

/// Default chunk width in shingle bytes.
pub const DEFAULT_CHUNK_LENGTH: usize = 8;

/// Default sketch width (number of hash functions, `L`).
pub const DEFAULT_SKETCH_WIDTH: usize = 1000;

/// Default per-chunk decay factor applied to a projection.
pub const DEFAULT_DECAY_RATE: f64 = 0.99;

/// Default seed for hash key generation.
pub const DEFAULT_KEY_SEED: u64 = 0x5eed_2016;

/// Smallest chunk width that can hold the shingle head (filler + source type).
pub const MIN_CHUNK_LENGTH: usize = 2;

/// Extra key words the multilinear hash needs beyond one per chunk byte.
pub const KEY_WORDS_PER_ROW_EXTRA: usize = 1;

/// Magic bytes for the snapshot binary format header.
pub const MAGIC_BYTES: &[u8; 4] = b"SHSK";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum sketch width accepted by configuration validation.
pub const MAX_SKETCH_WIDTH: usize = 1 << 20;

/// Maximum chunk width accepted by configuration validation.
pub const MAX_CHUNK_LENGTH: usize = 4096;

/// Maximum length of a single edge-list line.
pub const MAX_EDGE_LINE_LENGTH: usize = 1024;
