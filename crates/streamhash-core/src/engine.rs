//! # Sketch Engine
//!
//! The per-edge entry point.
//!
//! `SketchEngine::apply_edge` records the edge in its source node's history,
//! asks the chunker which chunks of that node's shingle changed, and folds
//! them into the projection of the edge's stream. Nothing else is touched.
//! Edges of one stream must be applied in arrival order; streams are
//! independent of each other.

use crate::accumulator::{Projection, ProjectionDelta, Sketch};
use crate::chunker::{ChunkDiff, build_shingle};
use crate::config::SketchConfig;
use crate::formats::{SketchSnapshot, StreamProjection};
use crate::hash::{ChunkHasher, HashKeyMatrix, MultilinearHash};
use crate::store::{MemoryStore, StreamStore};
use crate::types::{Edge, NodeKey, StreamHashError, StreamId};
use std::sync::Arc;

/// Incremental sketch engine over a stream store and a hash family.
#[derive(Debug, Clone)]
pub struct SketchEngine<S = MemoryStore, H = MultilinearHash> {
    config: SketchConfig,
    keys: Arc<HashKeyMatrix>,
    hasher: H,
    store: S,
}

impl SketchEngine {
    /// Create an in-memory engine whose keys derive from `config.seed`.
    ///
    /// Returns `StreamHashError::InvalidConfig` if the configuration fails
    /// validation.
    pub fn new(config: SketchConfig) -> Result<Self, StreamHashError> {
        config.validate()?;
        let keys = HashKeyMatrix::from_seed(config.sketch_width, config.chunk_length, config.seed);
        let store = MemoryStore::new(config.sketch_width);
        Self::with_parts(config, Arc::new(keys), MultilinearHash, store)
    }
}

impl<S: StreamStore, H: ChunkHasher> SketchEngine<S, H> {
    /// Assemble an engine from explicit parts.
    ///
    /// Validates the configuration and checks that both the keys and the
    /// store agree with its sketch width and chunk length.
    pub fn with_parts(
        config: SketchConfig,
        keys: Arc<HashKeyMatrix>,
        hasher: H,
        store: S,
    ) -> Result<Self, StreamHashError> {
        config.validate()?;
        keys.check_fits(config.sketch_width, config.chunk_length)?;
        if store.sketch_width() != config.sketch_width {
            return Err(StreamHashError::InvalidConfig(format!(
                "store width {} does not match sketch width {}",
                store.sketch_width(),
                config.sketch_width
            )));
        }
        Ok(Self {
            config,
            keys,
            hasher,
            store,
        })
    }

    /// Apply one edge and return the change it made to its stream's projection.
    pub fn apply_edge(&mut self, edge: &Edge) -> ProjectionDelta {
        let source = edge.source();
        self.store
            .append_outgoing_edge(edge.stream_id, source, edge.out_edge());

        let history = self.store.outgoing_history(edge.stream_id, source);
        let diff = ChunkDiff::between(
            history,
            edge.source_type,
            self.config.chunk_length,
            self.config.policy,
        );

        tracing::trace!(
            stream = edge.stream_id.0,
            node = edge.source_id.0,
            history_len = history.len(),
            incoming = diff.incoming.len(),
            outgoing = diff.outgoing.len(),
            "applying edge"
        );

        let projection = &mut self.store.get_or_create_stream(edge.stream_id).projection;
        projection.apply_diff(&diff, &self.keys, &self.hasher, self.config.decay_rate)
    }

    /// Apply edges in order. Returns the number applied.
    pub fn apply_edges<'a, I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let mut applied = 0;
        for edge in edges {
            self.apply_edge(edge);
            applied += 1;
        }
        applied
    }

    /// A stream's projection coordinates.
    pub fn projection(&self, stream: StreamId) -> Option<&[f64]> {
        self.store.projection(stream).map(Projection::as_slice)
    }

    /// A stream's binary sketch, derived from its current projection.
    pub fn sketch(&self, stream: StreamId) -> Option<Sketch> {
        self.store.projection(stream).map(Sketch::from_projection)
    }

    /// Rebuild a node's full shingle from its history. O(n), for inspection.
    pub fn node_shingle(&self, stream: StreamId, node: NodeKey) -> Option<Vec<u8>> {
        let history = self.store.outgoing_history(stream, node);
        (!history.is_empty()).then(|| build_shingle(node.node_type, history))
    }

    /// Number of streams seen so far.
    pub fn stream_count(&self) -> usize {
        self.store.stream_ids().len()
    }

    /// Capture every stream's projection, sorted by stream id.
    pub fn snapshot(&self) -> SketchSnapshot {
        let streams = self
            .store
            .stream_ids()
            .into_iter()
            .filter_map(|id| {
                self.store.projection(id).map(|p| StreamProjection {
                    stream_id: id,
                    projection: p.as_slice().to_vec(),
                })
            })
            .collect();
        SketchSnapshot {
            chunk_length: self.config.chunk_length,
            sketch_width: self.config.sketch_width,
            decay_rate: self.config.decay_rate,
            streams,
        }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn keys(&self) -> &Arc<HashKeyMatrix> {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the engine, keeping its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

// =============================================================================
// TESTS
// =============================================================================
