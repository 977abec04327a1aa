//! # streamhash-core
//!
//! Incremental, decayed sketches of interleaved typed-edge streams.
//!
//! Every stream keeps a projection vector of `L` real coordinates. Each node
//! of a stream is described by its shingle, the byte string of its source
//! type followed by the `(edge_type, dest_type)` pairs of its outgoing edges
//! in arrival order. The shingle is cut into fixed-width chunks and every
//! chunk is hashed by `L` keyed hash functions into the projection.
//!
//! ## Per-edge update
//!
//! ```text
//!  Edge ──► StreamStore::append_outgoing_edge
//!             │
//!             ▼
//!          ChunkDiff::between      (last one or two chunks only)
//!             │
//!             ▼
//!          Projection::apply_diff  (p = p * decay + h(c), p -= h(c'))
//! ```
//!
//! Work per edge is bounded by `chunk_length * L`; a node's history is never
//! rescanned. The sign pattern of a projection is its [`Sketch`].
//!
//! ## Example
//!
//! ```
//! use streamhash_core::{Edge, NodeId, SketchConfig, SketchEngine, StreamId};
//!
//! let config = SketchConfig::default().with_chunk_length(4).with_sketch_width(64);
//! let mut engine = SketchEngine::new(config)?;
//!
//! engine.apply_edge(&Edge {
//!     source_id: NodeId(1),
//!     source_type: b'A',
//!     dest_id: NodeId(2),
//!     dest_type: b'B',
//!     edge_type: b'e',
//!     stream_id: StreamId(0),
//! });
//!
//! let sketch = engine.sketch(StreamId(0)).expect("stream was created");
//! assert_eq!(sketch.width(), 64);
//! # Ok::<(), streamhash_core::StreamHashError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod accumulator;
pub mod chunker;
pub mod config;
pub mod engine;
pub mod formats;
pub mod hash;
pub mod primitives;
pub mod shard;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Edge, NodeId, NodeKey, OutEdge, StreamHashError, StreamId};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use accumulator::{Projection, ProjectionDelta, Sketch};
pub use chunker::{ChunkDiff, ChunkWindow, build_shingle, partition_shingle};
pub use config::{ChunkPolicy, SketchConfig};
pub use engine::SketchEngine;
pub use hash::{ChunkHasher, HashKeyMatrix, MultilinearHash};
pub use shard::ShardedEngine;
pub use store::{MemoryStore, StreamState, StreamStore};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{
    SketchSnapshot, StreamProjection, format_edge_line, parse_edge_line, parse_edge_list,
    snapshot_from_bytes, snapshot_to_bytes,
};
