//! # Hash Family
//!
//! The keyed hash functions that turn a chunk into a signed contribution.
//!
//! One hash function per sketch coordinate; function `i` is the shared
//! [`ChunkHasher`] evaluated with key row `i` of the [`HashKeyMatrix`].
//! Hashers are pure: the same chunk and key always give the same value.

use crate::primitives::KEY_WORDS_PER_ROW_EXTRA;
use crate::StreamHashError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

// =============================================================================
// CHUNKHASHER TRAIT
// =============================================================================

/// A keyed hash from a chunk to a signed integer contribution.
///
/// Implementations must be pure functions of `(chunk, key)` and must accept
/// keys of [`HashKeyMatrix::key_length`] words for any chunk of up to
/// `chunk_length` bytes.
pub trait ChunkHasher {
    /// Hash `chunk` under `key`.
    fn hash_chunk(&self, chunk: &[u8], key: &[u64]) -> i32;
}

/// Multilinear hashing over 64-bit words, reduced to a random sign.
///
/// `sum = key[0] + key[1]*c0 + key[2]*c1 + ...` with wrapping arithmetic;
/// the top bit of `sum` selects `+1` or `-1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultilinearHash;

impl ChunkHasher for MultilinearHash {
    fn hash_chunk(&self, chunk: &[u8], key: &[u64]) -> i32 {
        let Some((&offset, weights)) = key.split_first() else {
            return 0;
        };
        let sum = chunk
            .iter()
            .zip(weights)
            .fold(offset, |acc, (&byte, &w)| {
                acc.wrapping_add(w.wrapping_mul(u64::from(byte)))
            });
        if sum >> 63 == 1 { 1 } else { -1 }
    }
}

// =============================================================================
// HASH KEY MATRIX
// =============================================================================

/// The `L` key rows driving the hash family, fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashKeyMatrix {
    rows: Vec<Vec<u64>>,
    key_length: usize,
}

impl HashKeyMatrix {
    /// Words needed per row for chunks of `chunk_length` bytes.
    #[must_use]
    pub const fn required_key_length(chunk_length: usize) -> usize {
        chunk_length + KEY_WORDS_PER_ROW_EXTRA
    }

    /// Derive `width` rows for `chunk_length`-byte chunks from a seed.
    #[must_use]
    pub fn from_seed(width: usize, chunk_length: usize, seed: u64) -> Self {
        let key_length = Self::required_key_length(chunk_length);
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..width)
            .map(|_| (0..key_length).map(|_| rng.next_u64()).collect())
            .collect();
        Self { rows, key_length }
    }

    /// Wrap externally supplied rows.
    ///
    /// Returns `StreamHashError::InvalidKeys` if the number of rows differs
    /// from `width` or a row is too short for `chunk_length`.
    pub fn from_rows(
        rows: Vec<Vec<u64>>,
        width: usize,
        chunk_length: usize,
    ) -> Result<Self, StreamHashError> {
        if rows.len() != width {
            return Err(StreamHashError::InvalidKeys(format!(
                "expected {} key rows, got {}",
                width,
                rows.len()
            )));
        }
        let key_length = Self::required_key_length(chunk_length);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() < key_length) {
            return Err(StreamHashError::InvalidKeys(format!(
                "key row {} has {} words, need at least {}",
                i,
                row.len(),
                key_length
            )));
        }
        // rows may be longer than this chunk width needs
        let key_length = rows.iter().map(Vec::len).min().unwrap_or(key_length);
        Ok(Self { rows, key_length })
    }

    /// Number of rows (`L`).
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.len()
    }

    /// Length of the shortest row, in words.
    #[must_use]
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// All rows, in coordinate order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    /// Check the matrix fits a sketch of `width` coordinates over
    /// `chunk_length`-byte chunks.
    pub fn check_fits(&self, width: usize, chunk_length: usize) -> Result<(), StreamHashError> {
        if self.width() != width {
            return Err(StreamHashError::InvalidKeys(format!(
                "key matrix has {} rows, sketch width is {}",
                self.width(),
                width
            )));
        }
        let needed = Self::required_key_length(chunk_length);
        if self.key_length < needed {
            return Err(StreamHashError::InvalidKeys(format!(
                "key rows have {} words, chunk_length {} needs {}",
                self.key_length, chunk_length, needed
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multilinear_is_deterministic_sign() {
        let keys = HashKeyMatrix::from_seed(16, 4, 7);
        for row in keys.rows() {
            let a = MultilinearHash.hash_chunk(b" AeB", row);
            let b = MultilinearHash.hash_chunk(b" AeB", row);
            assert_eq!(a, b);
            assert!(a == 1 || a == -1);
        }
    }

    #[test]
    fn multilinear_follows_top_bit() {
        // offset alone decides an empty chunk
        assert_eq!(MultilinearHash.hash_chunk(b"", &[1 << 63]), 1);
        assert_eq!(MultilinearHash.hash_chunk(b"", &[0]), -1);
        // 0x40 * 2^57 = 2^63
        assert_eq!(MultilinearHash.hash_chunk(&[0x40], &[0, 1 << 57]), 1);
        assert_eq!(MultilinearHash.hash_chunk(&[0x20], &[0, 1 << 57]), -1);
    }

    #[test]
    fn same_seed_same_keys() {
        assert_eq!(
            HashKeyMatrix::from_seed(8, 5, 42),
            HashKeyMatrix::from_seed(8, 5, 42)
        );
        assert_ne!(
            HashKeyMatrix::from_seed(8, 5, 42),
            HashKeyMatrix::from_seed(8, 5, 43)
        );
    }

    #[test]
    fn seeded_matrix_shape() {
        let keys = HashKeyMatrix::from_seed(10, 6, 1);
        assert_eq!(keys.width(), 10);
        assert_eq!(keys.key_length(), 7);
        assert!(keys.rows().iter().all(|r| r.len() == 7));
        assert!(keys.check_fits(10, 6).is_ok());
    }

    #[test]
    fn from_rows_rejects_wrong_row_count() {
        let rows = vec![vec![0u64; 5]; 3];
        assert!(matches!(
            HashKeyMatrix::from_rows(rows, 4, 4),
            Err(StreamHashError::InvalidKeys(_))
        ));
    }

    #[test]
    fn from_rows_rejects_short_row() {
        let mut rows = vec![vec![0u64; 5]; 3];
        rows[1].truncate(4);
        assert!(HashKeyMatrix::from_rows(rows, 3, 4).is_err());
    }

    #[test]
    fn long_rows_fit_wider_chunks() {
        let rows = vec![vec![3u64; 20]; 16];
        let keys = HashKeyMatrix::from_rows(rows, 16, 4).expect("valid keys");
        assert_eq!(keys.key_length(), 20);
        assert!(keys.check_fits(16, 8).is_ok());
        assert!(keys.check_fits(16, 19).is_ok());
        assert!(keys.check_fits(16, 20).is_err());
    }

    #[test]
    fn key_length_is_shortest_row() {
        let mut rows = vec![vec![0u64; 12]; 3];
        rows[2].truncate(6);
        let keys = HashKeyMatrix::from_rows(rows, 3, 4).expect("valid keys");
        assert_eq!(keys.key_length(), 6);
        let err = keys.check_fits(3, 8).expect_err("rows too short");
        assert!(err.to_string().contains("key rows have 6 words"));
    }

    #[test]
    fn check_fits_rejects_wider_chunks() {
        let keys = HashKeyMatrix::from_seed(4, 4, 9);
        assert!(keys.check_fits(4, 8).is_err());
        assert!(keys.check_fits(5, 4).is_err());
    }
}
