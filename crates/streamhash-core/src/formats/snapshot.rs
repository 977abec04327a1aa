//! # Snapshot Format
//!
//! Binary serialization of per-stream projections.
//!
//! Layout: 4 magic bytes (`SHSK`), 1 version byte, then the
//! postcard-serialized `SketchSnapshot`. Streams are stored sorted by id;
//! decoding rejects anything else.

use crate::accumulator::{Projection, Sketch};
use crate::primitives;
use crate::types::{StreamHashError, StreamId};
use serde::{Deserialize, Serialize};

/// Maximum accepted snapshot size (500 MB).
pub const MAX_SNAPSHOT_SIZE: usize = 500 * 1024 * 1024;

/// Magic plus version byte.
const HEADER_LEN: usize = 5;

// =============================================================================
// SNAPSHOT DATA
// =============================================================================

/// One stream's projection at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamProjection {
    pub stream_id: StreamId,
    pub projection: Vec<f64>,
}

impl StreamProjection {
    /// The sign sketch of this projection.
    #[must_use]
    pub fn sketch(&self) -> Sketch {
        Sketch::from_projection(&Projection::from_values(self.projection.clone()))
    }
}

/// Every stream's projection together with the parameters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchSnapshot {
    pub chunk_length: usize,
    pub sketch_width: usize,
    pub decay_rate: f64,
    /// Sorted by stream id.
    pub streams: Vec<StreamProjection>,
}

impl SketchSnapshot {
    /// Look up one stream.
    #[must_use]
    pub fn stream(&self, id: StreamId) -> Option<&StreamProjection> {
        self.streams
            .binary_search_by_key(&id, |s| s.stream_id)
            .ok()
            .map(|i| &self.streams[i])
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a snapshot to bytes (magic + version + payload). No file I/O.
pub fn snapshot_to_bytes(snapshot: &SketchSnapshot) -> Result<Vec<u8>, StreamHashError> {
    let payload = postcard::to_stdvec(snapshot)
        .map_err(|e| StreamHashError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(primitives::MAGIC_BYTES);
    result.push(primitives::FORMAT_VERSION);
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a snapshot from bytes. No file I/O.
///
/// Size, magic and version are checked before the payload is decoded. The
/// decoded streams must have `sketch_width` coordinates each and strictly
/// ascending ids, since [`SketchSnapshot::stream`] relies on that order.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<SketchSnapshot, StreamHashError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(StreamHashError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let payload = strip_header(bytes)?;
    let snapshot: SketchSnapshot = postcard::from_bytes(payload).map_err(|e| {
        StreamHashError::SerializationError(format!("Failed to deserialize snapshot: {}", e))
    })?;

    check_streams(&snapshot)?;
    Ok(snapshot)
}

/// Check magic and version, returning the payload that follows them.
fn strip_header(bytes: &[u8]) -> Result<&[u8], StreamHashError> {
    if bytes.len() < HEADER_LEN {
        return Err(StreamHashError::SerializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_LEN
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[..4] != primitives::MAGIC_BYTES {
        return Err(StreamHashError::SerializationError(
            "Invalid magic bytes".to_string(),
        ));
    }
    if header[4] != primitives::FORMAT_VERSION {
        return Err(StreamHashError::SerializationError(format!(
            "Unsupported version: {} (expected {})",
            header[4],
            primitives::FORMAT_VERSION
        )));
    }
    Ok(payload)
}

fn check_streams(snapshot: &SketchSnapshot) -> Result<(), StreamHashError> {
    if let Some(bad) = snapshot
        .streams
        .iter()
        .find(|s| s.projection.len() != snapshot.sketch_width)
    {
        return Err(StreamHashError::SerializationError(format!(
            "stream {} has {} coordinates, snapshot width is {}",
            bad.stream_id,
            bad.projection.len(),
            snapshot.sketch_width
        )));
    }

    if let Some(pair) = snapshot
        .streams
        .windows(2)
        .find(|pair| pair[0].stream_id >= pair[1].stream_id)
    {
        return Err(StreamHashError::SerializationError(format!(
            "stream ids must be strictly ascending, found {} before {}",
            pair[0].stream_id, pair[1].stream_id
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
