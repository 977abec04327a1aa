//! # Stream State Store
//!
//! Per-stream adjacency history and projection vector.
//!
//! This module defines the `StreamStore` trait the engine writes through and
//! `MemoryStore`, its in-process implementation. History is append-only:
//! nothing in this crate removes or reorders an entry once recorded.

use crate::accumulator::Projection;
use crate::types::{NodeKey, OutEdge, StreamId};
use std::collections::HashMap;

// =============================================================================
// STREAM STATE
// =============================================================================

/// Everything one stream owns.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamState {
    /// Outgoing-edge history per source node, in arrival order.
    pub adjacency: HashMap<NodeKey, Vec<OutEdge>>,
    /// The stream's projection vector.
    pub projection: Projection,
}

impl StreamState {
    /// Fresh state with an all-zero projection of `width` coordinates.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            adjacency: HashMap::new(),
            projection: Projection::zeroed(width),
        }
    }

    /// Number of nodes with at least one outgoing edge.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of recorded edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

// =============================================================================
// STREAMSTORE TRAIT
// =============================================================================

/// The StreamStore trait defines the state operations the engine relies on.
///
/// Implementations create stream state lazily and must never reorder or
/// truncate a node's history.
pub trait StreamStore {
    /// Width of every projection this store creates.
    fn sketch_width(&self) -> usize;

    /// Get a stream's state, if the stream has been seen.
    fn stream(&self, stream: StreamId) -> Option<&StreamState>;

    /// Get a stream's state, creating it on first reference.
    fn get_or_create_stream(&mut self, stream: StreamId) -> &mut StreamState;

    /// Ids of all known streams, ascending.
    fn stream_ids(&self) -> Vec<StreamId>;

    /// Append an entry to a node's outgoing history. O(1) amortized.
    fn append_outgoing_edge(&mut self, stream: StreamId, source: NodeKey, entry: OutEdge) {
        self.get_or_create_stream(stream)
            .adjacency
            .entry(source)
            .or_default()
            .push(entry);
    }

    /// A node's outgoing history; empty if the node or stream is unknown.
    fn outgoing_history(&self, stream: StreamId, node: NodeKey) -> &[OutEdge] {
        self.stream(stream)
            .and_then(|s| s.adjacency.get(&node))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A stream's projection, if the stream has been seen.
    fn projection(&self, stream: StreamId) -> Option<&Projection> {
        self.stream(stream).map(|s| &s.projection)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory stream store.
///
/// Lookups are hashed so the per-edge path stays O(1) amortized;
/// [`StreamStore::stream_ids`] sorts for deterministic iteration.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    streams: HashMap<StreamId, StreamState>,
    sketch_width: usize,
}

impl MemoryStore {
    /// Create an empty store whose projections have `sketch_width` coordinates.
    #[must_use]
    pub fn new(sketch_width: usize) -> Self {
        Self {
            streams: HashMap::new(),
            sketch_width,
        }
    }

    /// Number of known streams.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Move every stream of `other` into this store.
    ///
    /// Intended for stores that saw disjoint stream sets; a stream present
    /// in both keeps the state from `other`.
    pub fn absorb(&mut self, other: MemoryStore) {
        self.streams.extend(other.streams);
    }
}

impl StreamStore for MemoryStore {
    fn sketch_width(&self) -> usize {
        self.sketch_width
    }

    fn stream(&self, stream: StreamId) -> Option<&StreamState> {
        self.streams.get(&stream)
    }

    fn get_or_create_stream(&mut self, stream: StreamId) -> &mut StreamState {
        let width = self.sketch_width;
        self.streams.entry(stream).or_insert_with(|| {
            tracing::debug!(stream = stream.0, "creating stream state");
            StreamState::new(width)
        })
    }

    fn stream_ids(&self) -> Vec<StreamId> {
        let mut ids: Vec<StreamId> = self.streams.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

// =============================================================================
// TESTS
// =============================================================================
