//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the sketches are INVALID.
//!
//! ## Tiers
//! - T0: Configuration and Keys
//! - T1: Chunk Reconstruction
//! - T2: Projection Accumulation
//! - T3: Stream Isolation and Snapshots

use std::sync::Arc;
use streamhash_core::{
    ChunkDiff, ChunkHasher, ChunkPolicy, Edge, HashKeyMatrix, MemoryStore, MultilinearHash,
    NodeId, NodeKey, OutEdge, Projection, SketchConfig, SketchEngine, StreamHashError, StreamId,
    StreamStore,
};

fn edge(stream: u64, src: u64, src_type: u8, edge_type: u8, dest_type: u8) -> Edge {
    Edge {
        source_id: NodeId(src),
        source_type: src_type,
        dest_id: NodeId(src + 1000),
        dest_type,
        edge_type,
        stream_id: StreamId(stream),
    }
}

fn history(pairs: &[(u8, u8)]) -> Vec<OutEdge> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &(e, d))| OutEdge::new(NodeId(i as u64), d, e))
        .collect()
}

fn chunks(diff_side: &[Vec<u8>]) -> Vec<&[u8]> {
    diff_side.iter().map(Vec::as_slice).collect()
}

// =============================================================================
// TIER T0: CONFIGURATION AND KEYS
// =============================================================================

mod t0_configuration {
    use super::*;

    /// T0.1: Defaults are accepted.
    #[test]
    fn default_config_valid() {
        assert!(SketchConfig::default().validate().is_ok());
        assert!(SketchEngine::new(SketchConfig::default()).is_ok());
    }

    /// T0.2: Out-of-range parameters are rejected at construction time.
    #[test]
    fn invalid_parameters_rejected() {
        let bad = [
            SketchConfig::default().with_chunk_length(0),
            SketchConfig::default().with_chunk_length(1),
            SketchConfig::default().with_sketch_width(0),
            SketchConfig::default().with_decay_rate(0.0),
            SketchConfig::default().with_decay_rate(1.5),
            SketchConfig::default().with_decay_rate(f64::NAN),
        ];
        for config in bad {
            let result = SketchEngine::new(config);
            assert!(matches!(result, Err(StreamHashError::InvalidConfig(_))));
        }
    }

    /// T0.3: The decay rate bounds are exclusive.
    #[test]
    fn decay_bounds_exclusive() {
        assert!(SketchConfig::default().with_decay_rate(1.0).validate().is_err());
        assert!(SketchConfig::default().with_decay_rate(0.999).validate().is_ok());
    }

    /// T0.4: Key rows shorter than chunk_length + 1 words are rejected.
    #[test]
    fn short_key_rows_rejected() {
        let rows = vec![vec![1u64; 4]; 8];
        let result = HashKeyMatrix::from_rows(rows, 8, 4);
        assert!(matches!(result, Err(StreamHashError::InvalidKeys(_))));

        let rows = vec![vec![1u64; 5]; 8];
        assert!(HashKeyMatrix::from_rows(rows, 8, 4).is_ok());
    }

    /// T0.5: Supplied rows longer than required serve wider chunks too.
    #[test]
    fn long_supplied_rows_accepted_for_wider_chunks() {
        let rows = vec![vec![0x9e37_79b9_7f4a_7c15u64; 20]; 16];
        let keys = Arc::new(HashKeyMatrix::from_rows(rows, 16, 4).expect("valid keys"));
        let config = SketchConfig::default()
            .with_chunk_length(8)
            .with_sketch_width(16);

        let engine =
            SketchEngine::with_parts(config, keys, MultilinearHash, MemoryStore::new(16));
        assert!(engine.is_ok());
    }

    /// T0.6: The same seed always yields the same keys.
    #[test]
    fn seeded_keys_deterministic() {
        let a = HashKeyMatrix::from_seed(16, 6, 42);
        let b = HashKeyMatrix::from_seed(16, 6, 42);
        let c = HashKeyMatrix::from_seed(16, 6, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

// =============================================================================
// TIER T1: CHUNK RECONSTRUCTION
// =============================================================================

mod t1_chunk_reconstruction {
    use super::*;

    /// T1.1: A node's first edge hashes the filler-headed shingle as a whole.
    #[test]
    fn first_edge_includes_filler() {
        let diff = ChunkDiff::between(&history(&[(b'e', b'B')]), b'A', 4, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&diff.incoming), vec![b" AeB".as_slice()]);
        assert!(diff.outgoing.is_empty());
    }

    /// T1.2: Walkthrough for `A -e-> B, A -f-> C, A -g-> D` with chunk_length 4.
    #[test]
    fn three_edge_walkthrough() {
        let full = history(&[(b'e', b'B'), (b'f', b'C'), (b'g', b'D')]);

        let second = ChunkDiff::between(&full[..2], b'A', 4, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&second.incoming), vec![b"fC".as_slice()]);
        // " AeB" was full, so nothing is superseded
        assert!(second.outgoing.is_empty());

        let third = ChunkDiff::between(&full, b'A', 4, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&third.incoming), vec![b"fCgD".as_slice()]);
        assert_eq!(chunks(&third.outgoing), vec![b"fC".as_slice()]);
    }

    /// T1.3: A one-byte last chunk brings the completed chunk before it along.
    #[test]
    fn one_byte_last_chunk_window() {
        let full = history(&[(b'e', b'B'), (b'f', b'C'), (b'g', b'D'), (b'h', b'E')]);

        // " Ae" + "B"
        let first = ChunkDiff::between(&full[..1], b'A', 3, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&first.incoming), vec![b" Ae".as_slice(), b"B".as_slice()]);

        // " Ae" + "BfC"
        let second = ChunkDiff::between(&full[..2], b'A', 3, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&second.incoming), vec![b"BfC".as_slice()]);
        assert_eq!(chunks(&second.outgoing), vec![b"B".as_slice()]);

        // " Ae" + "BfC" + "gD"
        let third = ChunkDiff::between(&full[..3], b'A', 3, ChunkPolicy::Symmetric);
        assert_eq!(chunks(&third.incoming), vec![b"gD".as_slice()]);
        assert!(third.outgoing.is_empty());

        // " Ae" + "BfC" + "gDh" + "E"
        let fourth = ChunkDiff::between(&full, b'A', 3, ChunkPolicy::Symmetric);
        assert_eq!(
            chunks(&fourth.incoming),
            vec![b"gDh".as_slice(), b"E".as_slice()]
        );
        assert_eq!(chunks(&fourth.outgoing), vec![b"gD".as_slice()]);
    }

    /// T1.4: The add-only policy folds in the last chunk and nothing else.
    #[test]
    fn add_only_takes_last_chunk() {
        let full = history(&[(b'e', b'B'), (b'f', b'C'), (b'g', b'D'), (b'h', b'E')]);
        for n in 1..=full.len() {
            let diff = ChunkDiff::between(&full[..n], b'A', 3, ChunkPolicy::AddOnly);
            assert_eq!(diff.incoming.len(), 1);
            assert!(diff.outgoing.is_empty());
        }
        let last = ChunkDiff::between(&full, b'A', 3, ChunkPolicy::AddOnly);
        assert_eq!(chunks(&last.incoming), vec![b"E".as_slice()]);
    }

    /// T1.5: The engine rebuilds the scenario shingle with its filler head.
    #[test]
    fn engine_shingle_has_filler_head() {
        let mut engine =
            SketchEngine::new(SketchConfig::default().with_chunk_length(4).with_sketch_width(8))
                .expect("engine");
        engine.apply_edges(&[
            edge(0, 1, b'A', b'e', b'B'),
            edge(0, 1, b'A', b'f', b'C'),
            edge(0, 1, b'A', b'g', b'D'),
        ]);
        let shingle = engine.node_shingle(StreamId(0), NodeKey::new(NodeId(1), b'A'));
        assert_eq!(shingle, Some(b" AeBfCgD".to_vec()));
    }
}

// =============================================================================
// TIER T2: PROJECTION ACCUMULATION
// =============================================================================

mod t2_accumulation {
    use super::*;

    /// Hashes chunks containing `z` to zero, everything else as usual.
    struct SilentOnZ;

    impl ChunkHasher for SilentOnZ {
        fn hash_chunk(&self, chunk: &[u8], key: &[u64]) -> i32 {
            if chunk.contains(&b'z') {
                0
            } else {
                MultilinearHash.hash_chunk(chunk, key)
            }
        }
    }

    fn config() -> SketchConfig {
        SketchConfig::default()
            .with_chunk_length(4)
            .with_sketch_width(32)
            .with_decay_rate(0.5)
    }

    /// T2.1: The walkthrough projection is decay, fold and subtract in order.
    #[test]
    fn walkthrough_projection() {
        let config = config();
        let keys = HashKeyMatrix::from_seed(32, 4, config.seed);
        let mut engine = SketchEngine::new(config).expect("engine");
        engine.apply_edges(&[
            edge(0, 1, b'A', b'e', b'B'),
            edge(0, 1, b'A', b'f', b'C'),
            edge(0, 1, b'A', b'g', b'D'),
        ]);

        let mut expected = Projection::zeroed(32);
        expected.fold_in(b" AeB", &keys, &MultilinearHash, 0.5);
        expected.fold_in(b"fC", &keys, &MultilinearHash, 0.5);
        expected.fold_in(b"fCgD", &keys, &MultilinearHash, 0.5);
        expected.take_out(b"fC", &keys, &MultilinearHash);

        assert_eq!(engine.projection(StreamId(0)), Some(expected.as_slice()));
    }

    /// T2.2: Contributions that add nothing still decay the existing projection.
    #[test]
    fn silent_edges_shrink_projection() {
        let config = config();
        let keys = Arc::new(HashKeyMatrix::from_seed(32, 4, config.seed));
        let mut engine =
            SketchEngine::with_parts(config, keys, SilentOnZ, MemoryStore::new(32)).expect("engine");

        for (e, d) in [(b'a', b'B'), (b'b', b'C'), (b'c', b'D')] {
            engine.apply_edge(&edge(0, 1, b'X', e, d));
        }
        let magnitude = |engine: &SketchEngine<MemoryStore, SilentOnZ>| {
            engine
                .store()
                .stream(StreamId(0))
                .map(|s| s.projection.magnitude())
                .unwrap_or_default()
        };
        let mut previous = magnitude(&engine);
        assert!(previous > 0.0);

        for _ in 0..60 {
            engine.apply_edge(&edge(0, 2, b'z', b'z', b'z'));
            let current = magnitude(&engine);
            assert!(current <= previous * 0.5 + 1e-12);
            previous = current;
        }
        assert!(previous < 1e-9);
    }

    /// T2.3: The delta returned for an edge is exactly the projection change.
    #[test]
    fn delta_matches_projection_change() {
        let mut engine = SketchEngine::new(config()).expect("engine");
        engine.apply_edge(&edge(0, 1, b'A', b'e', b'B'));
        let before = engine.projection(StreamId(0)).expect("stream").to_vec();

        let delta = engine.apply_edge(&edge(0, 1, b'A', b'f', b'C'));
        let after = engine.projection(StreamId(0)).expect("stream");
        for ((b, a), d) in before.iter().zip(after).zip(delta.values()) {
            assert_eq!(a - b, *d);
        }
    }

    /// T2.4: Reordering a stream's edges changes its projection.
    #[test]
    fn edge_order_matters() {
        let forward = [
            edge(0, 1, b'A', b'e', b'B'),
            edge(0, 1, b'A', b'f', b'C'),
            edge(0, 1, b'A', b'g', b'D'),
            edge(0, 1, b'A', b'h', b'E'),
        ];
        let mut reversed = forward;
        reversed.reverse();

        let mut a = SketchEngine::new(config()).expect("engine");
        let mut b = SketchEngine::new(config()).expect("engine");
        a.apply_edges(&forward);
        b.apply_edges(&reversed);
        assert_ne!(a.projection(StreamId(0)), b.projection(StreamId(0)));
    }
}

// =============================================================================
// TIER T3: STREAM ISOLATION AND SNAPSHOTS
// =============================================================================

mod t3_streams {
    use super::*;
    use streamhash_core::{snapshot_from_bytes, snapshot_to_bytes};

    fn config() -> SketchConfig {
        SketchConfig::default()
            .with_chunk_length(4)
            .with_sketch_width(40)
    }

    /// T3.1: Streams are created lazily on their first edge.
    #[test]
    fn streams_created_lazily() {
        let mut engine = SketchEngine::new(config()).expect("engine");
        assert_eq!(engine.stream_count(), 0);
        engine.apply_edge(&edge(9, 1, b'A', b'e', b'B'));
        assert_eq!(engine.stream_count(), 1);
        assert!(engine.projection(StreamId(8)).is_none());
        assert!(engine.sketch(StreamId(8)).is_none());
    }

    /// T3.2: Interleaving does not change any stream's projection.
    #[test]
    fn interleaving_is_invisible() {
        let one = [
            edge(1, 1, b'A', b'e', b'B'),
            edge(1, 1, b'A', b'f', b'C'),
            edge(1, 2, b'B', b'g', b'D'),
        ];
        let two = [edge(2, 1, b'A', b'e', b'B'), edge(2, 1, b'A', b'q', b'Q')];

        let mut separate = SketchEngine::new(config()).expect("engine");
        separate.apply_edges(&one);
        separate.apply_edges(&two);

        let mut interleaved = SketchEngine::new(config()).expect("engine");
        interleaved.apply_edges(&[one[0], two[0], one[1], two[1], one[2]]);

        assert_eq!(separate.snapshot(), interleaved.snapshot());
    }

    /// T3.3: Same node id in two streams means two unrelated histories.
    #[test]
    fn node_ids_scoped_by_stream() {
        let mut engine = SketchEngine::new(config()).expect("engine");
        engine.apply_edge(&edge(1, 5, b'A', b'e', b'B'));
        engine.apply_edge(&edge(2, 5, b'A', b'f', b'C'));

        let key = NodeKey::new(NodeId(5), b'A');
        assert_eq!(engine.node_shingle(StreamId(1), key), Some(b" AeB".to_vec()));
        assert_eq!(engine.node_shingle(StreamId(2), key), Some(b" AfC".to_vec()));
    }

    /// T3.4: A snapshot survives serialization and keeps the sketches.
    #[test]
    fn snapshot_roundtrip_keeps_sketches() {
        let mut engine = SketchEngine::new(config()).expect("engine");
        for i in 0..40u64 {
            engine.apply_edge(&edge(i % 3, i % 4, b'A', b'a' + (i % 5) as u8, b'M'));
        }

        let snapshot = engine.snapshot();
        let bytes = snapshot_to_bytes(&snapshot).expect("serialize");
        let restored = snapshot_from_bytes(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);

        for stream in 0..3u64 {
            let id = StreamId(stream);
            let live = engine.sketch(id).expect("live sketch");
            let stored = restored.stream(id).expect("stored stream").sketch();
            assert_eq!(live, stored);
        }
    }
}
