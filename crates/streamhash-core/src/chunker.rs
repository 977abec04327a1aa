//! # Chunker
//!
//! Incremental chunk derivation for node shingles.
//!
//! A node's shingle is the byte string
//! `FILLER, source_type, e1, d1, e2, d2, ...` built from its outgoing-edge
//! history, oldest edge first. The shingle is cut into fixed-width chunks
//! from the front, so only the rightmost chunk can be shorter than
//! `chunk_length`.
//!
//! Appending an edge only ever changes the last one or two chunks. This
//! module derives those chunks by walking the history backwards from the
//! newest edge; the full shingle is never built on the update path.
//! [`build_shingle`] and [`partition_shingle`] are the from-scratch
//! reference the incremental path must agree with.
//!
//! Every function here expects `chunk_length >= 1`.

use crate::config::ChunkPolicy;
use crate::primitives::SHINGLE_HEAD_FILLER;
use crate::types::OutEdge;

/// Length of the shingle of a node with `n_edges` outgoing edges.
#[must_use]
pub const fn shingle_length(n_edges: usize) -> usize {
    2 * (n_edges + 1)
}

/// Length of the rightmost chunk of a shingle of `shingle_len` bytes.
#[must_use]
pub const fn last_chunk_length(shingle_len: usize, chunk_length: usize) -> usize {
    match shingle_len % chunk_length {
        0 => chunk_length,
        rem => rem,
    }
}

/// The shingle, right to left, produced lazily from the newest edge back to
/// the head.
fn reversed_shingle(history: &[OutEdge], source_type: u8) -> impl Iterator<Item = u8> + '_ {
    history
        .iter()
        .rev()
        .flat_map(|e| [e.dest_type, e.edge_type])
        .chain([source_type, SHINGLE_HEAD_FILLER])
}

/// Pull `len` bytes off a reversed shingle and restore left-to-right order.
fn take_chunk(bytes: &mut impl Iterator<Item = u8>, len: usize) -> Vec<u8> {
    let mut chunk: Vec<u8> = bytes.take(len).collect();
    chunk.reverse();
    chunk
}

/// The rightmost chunk of a node's shingle.
#[must_use]
pub fn last_chunk(history: &[OutEdge], source_type: u8, chunk_length: usize) -> Vec<u8> {
    let len = last_chunk_length(shingle_length(history.len()), chunk_length);
    take_chunk(&mut reversed_shingle(history, source_type), len)
}

// =============================================================================
// CHUNK WINDOW
// =============================================================================

/// The last and second-to-last chunks of a node's shingle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkWindow {
    /// Rightmost chunk, `1..=chunk_length` bytes.
    pub last: Vec<u8>,
    /// Full-width chunk left of `last`, absent when the shingle is a single chunk.
    pub second_last: Option<Vec<u8>>,
}

impl ChunkWindow {
    /// Derive the window from a history that already contains the newest edge.
    ///
    /// Touches at most `ceil((last_len + chunk_length) / 2)` history entries.
    #[must_use]
    pub fn from_history(history: &[OutEdge], source_type: u8, chunk_length: usize) -> Self {
        let shingle_len = shingle_length(history.len());
        let last_len = last_chunk_length(shingle_len, chunk_length);

        let mut bytes = reversed_shingle(history, source_type);
        let last = take_chunk(&mut bytes, last_len);
        let second_last = (shingle_len > last_len).then(|| take_chunk(&mut bytes, chunk_length));

        Self { last, second_last }
    }

    /// Chunks of the window in shingle order (second-to-last first).
    #[must_use]
    pub fn into_chunks(self) -> Vec<Vec<u8>> {
        match self.second_last {
            Some(second_last) => vec![second_last, self.last],
            None => vec![self.last],
        }
    }
}

// =============================================================================
// CHUNK DIFF
// =============================================================================

/// Chunks to fold into (`incoming`) and take out of (`outgoing`) a
/// projection after one edge was appended to a node's history.
///
/// Both lists are in shingle order, oldest chunk first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkDiff {
    pub incoming: Vec<Vec<u8>>,
    pub outgoing: Vec<Vec<u8>>,
}

impl ChunkDiff {
    /// Compute the diff for the newest entry of `history`.
    ///
    /// `history` must already contain the new edge; the state before it is
    /// `history[..n - 1]`. An empty history yields an empty diff.
    ///
    /// Under [`ChunkPolicy::Symmetric`] the superseded chunk is the previous
    /// last chunk, and only when it was partial: a full chunk keeps its
    /// content when the shingle grows. A node's first edge has nothing to
    /// supersede since a bare shingle head is never hashed. Requires
    /// `chunk_length >= 2` so a first shingle spans at most two chunks.
    #[must_use]
    pub fn between(
        history: &[OutEdge],
        source_type: u8,
        chunk_length: usize,
        policy: ChunkPolicy,
    ) -> Self {
        let Some((_, before)) = history.split_last() else {
            return Self::default();
        };

        let window = ChunkWindow::from_history(history, source_type, chunk_length);

        match policy {
            ChunkPolicy::AddOnly => Self {
                incoming: vec![window.last],
                outgoing: Vec::new(),
            },
            ChunkPolicy::Symmetric if before.is_empty() => Self {
                incoming: window.into_chunks(),
                outgoing: Vec::new(),
            },
            ChunkPolicy::Symmetric => {
                let previous = last_chunk(before, source_type, chunk_length);
                let outgoing = if previous.len() < chunk_length {
                    vec![previous]
                } else {
                    Vec::new()
                };
                // A one-byte last chunk means the new edge also closed the chunk before it.
                let incoming = if window.last.len() == 1 {
                    window.into_chunks()
                } else {
                    vec![window.last]
                };
                Self { incoming, outgoing }
            }
        }
    }

    /// True if nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

// =============================================================================
// FROM-SCRATCH REFERENCE
// =============================================================================

/// Build the full shingle of a node. O(n); never used on the update path.
#[must_use]
pub fn build_shingle(source_type: u8, history: &[OutEdge]) -> Vec<u8> {
    let mut shingle = Vec::with_capacity(shingle_length(history.len()));
    shingle.push(SHINGLE_HEAD_FILLER);
    shingle.push(source_type);
    for e in history {
        shingle.push(e.edge_type);
        shingle.push(e.dest_type);
    }
    shingle
}

/// Cut a shingle into `chunk_length`-wide pieces from the front.
#[must_use]
pub fn partition_shingle(shingle: &[u8], chunk_length: usize) -> Vec<&[u8]> {
    shingle.chunks(chunk_length).collect()
}

// =============================================================================
// TESTS
// =============================================================================
