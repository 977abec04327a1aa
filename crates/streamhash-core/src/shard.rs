//! # Sharded Ingestion
//!
//! Streams are independent, so they can be processed on separate threads as
//! long as each stream's own edges stay in order. `ShardedEngine` owns one
//! worker per shard; an edge goes to shard `stream_id % shards` over a
//! bounded channel, which keeps every stream on exactly one worker and
//! preserves its arrival order. No locking is involved.

use crate::config::SketchConfig;
use crate::engine::SketchEngine;
use crate::hash::{HashKeyMatrix, MultilinearHash};
use crate::store::MemoryStore;
use crate::types::{Edge, StreamHashError, StreamId};
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Edges buffered per shard before `submit` blocks.
const SHARD_QUEUE_DEPTH: usize = 4096;

/// A pool of single-threaded engines partitioned by stream id.
#[derive(Debug)]
pub struct ShardedEngine {
    config: SketchConfig,
    keys: Arc<HashKeyMatrix>,
    senders: Vec<Sender<Edge>>,
    workers: Vec<JoinHandle<MemoryStore>>,
}

impl ShardedEngine {
    /// Start `shards` workers sharing one key matrix.
    pub fn spawn(config: SketchConfig, shards: usize) -> Result<Self, StreamHashError> {
        if shards == 0 {
            return Err(StreamHashError::InvalidConfig(
                "shard count must be at least 1".to_string(),
            ));
        }
        config.validate()?;
        let keys = Arc::new(HashKeyMatrix::from_seed(
            config.sketch_width,
            config.chunk_length,
            config.seed,
        ));

        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);
        for shard in 0..shards {
            let mut engine = SketchEngine::with_parts(
                config.clone(),
                Arc::clone(&keys),
                MultilinearHash,
                MemoryStore::new(config.sketch_width),
            )?;
            let (tx, rx) = bounded::<Edge>(SHARD_QUEUE_DEPTH);
            let worker = thread::Builder::new()
                .name(format!("streamhash-shard-{}", shard))
                .spawn(move || {
                    let mut applied = 0usize;
                    for edge in rx {
                        engine.apply_edge(&edge);
                        applied += 1;
                    }
                    tracing::debug!(shard, applied, "shard drained");
                    engine.into_store()
                })
                .map_err(|e| StreamHashError::IoError(format!("spawn shard {}: {}", shard, e)))?;
            senders.push(tx);
            workers.push(worker);
        }

        tracing::debug!(shards, "sharded engine started");
        Ok(Self {
            config,
            keys,
            senders,
            workers,
        })
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.senders.len()
    }

    /// The shard that owns a stream.
    pub fn shard_of(&self, stream: StreamId) -> usize {
        (stream.0 % self.senders.len() as u64) as usize
    }

    /// Route an edge to its stream's shard. Blocks while that shard's queue is full.
    pub fn submit(&self, edge: Edge) -> Result<(), StreamHashError> {
        let shard = self.shard_of(edge.stream_id);
        self.senders[shard]
            .send(edge)
            .map_err(|_| StreamHashError::ShardUnavailable(shard))
    }

    /// Close the queues, wait for every worker and merge their streams into one engine.
    pub fn finish(self) -> Result<SketchEngine, StreamHashError> {
        let Self {
            config,
            keys,
            senders,
            workers,
        } = self;
        drop(senders);

        let mut merged = MemoryStore::new(config.sketch_width);
        for (shard, worker) in workers.into_iter().enumerate() {
            let store = worker
                .join()
                .map_err(|_| StreamHashError::ShardPanicked(shard))?;
            merged.absorb(store);
        }
        SketchEngine::with_parts(config, keys, MultilinearHash, merged)
    }
}
