//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use streamhash_core::formats::MAX_SNAPSHOT_SIZE;
use streamhash_core::{
    ChunkPolicy, Edge, NodeId, NodeKey, ShardedEngine, SketchConfig, SketchEngine, SketchSnapshot,
    StreamHashError, StreamId, parse_edge_line, partition_shingle, snapshot_from_bytes,
    snapshot_to_bytes,
};

// =============================================================================
// PATHS
// =============================================================================

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

fn io_error(what: &str, path: &Path, e: std::io::Error) -> StreamHashError {
    StreamHashError::IoError(format!("{} '{}': {}", what, path.display(), e))
}

/// Canonicalize an input path, which must be a regular file.
///
/// Files read whole pass a `max_size`; edge lists are streamed and pass `None`.
fn resolve_input(path: &Path, max_size: Option<u64>) -> Result<PathBuf, StreamHashError> {
    let resolved = path
        .canonicalize()
        .map_err(|e| io_error("Cannot resolve input", path, e))?;
    let metadata =
        std::fs::metadata(&resolved).map_err(|e| io_error("Cannot stat input", path, e))?;

    if !metadata.is_file() {
        return Err(StreamHashError::IoError(format!(
            "Input '{}' is not a regular file",
            path.display()
        )));
    }
    match max_size {
        Some(max) if metadata.len() > max => Err(StreamHashError::SerializationError(format!(
            "Input '{}' is {} bytes, limit is {}",
            path.display(),
            metadata.len(),
            max
        ))),
        _ => Ok(resolved),
    }
}

/// Canonicalize the directory a snapshot will be written into.
///
/// The directory must exist; the file itself may not, but must not be a
/// directory when it does.
fn resolve_output(path: &Path) -> Result<PathBuf, StreamHashError> {
    let name = path.file_name().ok_or_else(|| {
        StreamHashError::IoError(format!("Output '{}' has no file name", path.display()))
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let dir = dir
        .canonicalize()
        .map_err(|e| io_error("Cannot resolve output directory", dir, e))?;

    let resolved = dir.join(name);
    if resolved.is_dir() {
        return Err(StreamHashError::IoError(format!(
            "Output '{}' is a directory",
            path.display()
        )));
    }
    Ok(resolved)
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Contents of a configuration file.
///
/// ```toml
/// shards = 4
///
/// [sketch]
/// chunk_length = 8
/// sketch_width = 1000
/// decay_rate = 0.99
/// seed = 42
/// policy = "symmetric"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sketch: SketchConfig,
    pub shards: Option<usize>,
}

/// Sketch parameters given on the command line. Each one wins over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub chunk_length: Option<usize>,
    pub sketch_width: Option<usize>,
    pub decay_rate: Option<f64>,
    pub seed: Option<u64>,
    pub policy: Option<String>,
}

impl ConfigOverrides {
    /// Apply every override that was given.
    pub fn apply(&self, mut config: SketchConfig) -> Result<SketchConfig, StreamHashError> {
        if let Some(chunk_length) = self.chunk_length {
            config = config.with_chunk_length(chunk_length);
        }
        if let Some(sketch_width) = self.sketch_width {
            config = config.with_sketch_width(sketch_width);
        }
        if let Some(decay_rate) = self.decay_rate {
            config = config.with_decay_rate(decay_rate);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(policy) = &self.policy {
            config = config.with_policy(parse_policy(policy)?);
        }
        Ok(config)
    }
}

/// Parse a chunk policy name as it appears in config files.
pub fn parse_policy(name: &str) -> Result<ChunkPolicy, StreamHashError> {
    match name {
        "symmetric" => Ok(ChunkPolicy::Symmetric),
        "add-only" => Ok(ChunkPolicy::AddOnly),
        _ => Err(StreamHashError::InvalidConfig(format!(
            "Unknown policy: {}. Use: symmetric, add-only",
            name
        ))),
    }
}

/// Load settings from an optional TOML file, apply overrides and validate.
pub fn load_settings(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Settings, StreamHashError> {
    let mut settings = match path {
        Some(path) => {
            let path = resolve_input(path, Some(MAX_CONFIG_FILE_SIZE))?;
            let text = std::fs::read_to_string(&path)
                .map_err(|e| StreamHashError::IoError(format!("Read config: {}", e)))?;
            toml::from_str::<Settings>(&text).map_err(|e| {
                StreamHashError::InvalidConfig(format!("{}: {}", path.display(), e))
            })?
        }
        None => Settings::default(),
    };

    settings.sketch = overrides.apply(settings.sketch)?;
    settings.sketch.validate()?;
    if settings.shards == Some(0) {
        return Err(StreamHashError::InvalidConfig(
            "shards must be at least 1".to_string(),
        ));
    }

    tracing::debug!(
        chunk_length = settings.sketch.chunk_length,
        sketch_width = settings.sketch.sketch_width,
        decay_rate = settings.sketch.decay_rate,
        policy = ?settings.sketch.policy,
        "configuration loaded"
    );
    Ok(settings)
}

// =============================================================================
// EDGE INPUT
// =============================================================================

/// Stream an edge list through `apply`, one record at a time.
///
/// Blank and `#` lines are skipped. Returns the number of edges applied.
fn for_each_edge<F>(path: &Path, mut apply: F) -> Result<usize, StreamHashError>
where
    F: FnMut(Edge) -> Result<(), StreamHashError>,
{
    let file = File::open(path)
        .map_err(|e| StreamHashError::IoError(format!("Open '{}': {}", path.display(), e)))?;

    let mut count = 0;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line =
            line.map_err(|e| StreamHashError::IoError(format!("Read line {}: {}", i + 1, e)))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        apply(parse_edge_line(&line, i + 1)?)?;
        count += 1;
    }
    Ok(count)
}

// =============================================================================
// OUTPUT
// =============================================================================

fn snapshot_json(snapshot: &SketchSnapshot) -> serde_json::Value {
    let streams: Vec<serde_json::Value> = snapshot
        .streams
        .iter()
        .map(|s| {
            let sketch = s.sketch();
            serde_json::json!({
                "stream_id": s.stream_id.0,
                "bits_set": sketch.count_ones(),
                "sketch": sketch.to_bit_string(),
            })
        })
        .collect();

    serde_json::json!({
        "chunk_length": snapshot.chunk_length,
        "sketch_width": snapshot.sketch_width,
        "decay_rate": snapshot.decay_rate,
        "stream_count": snapshot.streams.len(),
        "streams": streams,
    })
}

fn print_snapshot(snapshot: &SketchSnapshot, verbose: bool) {
    println!(
        "Streams: {}  (chunk_length {}, sketch_width {}, decay_rate {})",
        snapshot.streams.len(),
        snapshot.chunk_length,
        snapshot.sketch_width,
        snapshot.decay_rate
    );
    for stream in &snapshot.streams {
        let sketch = stream.sketch();
        println!(
            "stream {}: {}/{} bits set",
            stream.stream_id,
            sketch.count_ones(),
            sketch.width()
        );
        if verbose {
            println!("  {}", sketch.to_bit_string());
        }
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Sketch an edge list, optionally saving a snapshot.
pub fn cmd_run(
    config: &SketchConfig,
    edges_path: &Path,
    output: Option<&Path>,
    shards: usize,
    json_mode: bool,
    verbose: bool,
) -> Result<(), StreamHashError> {
    let edges_path = resolve_input(edges_path, None)?;
    let output = output.map(resolve_output).transpose()?;

    let (engine, edge_count) = if shards > 1 {
        let pool = ShardedEngine::spawn(config.clone(), shards)?;
        let count = for_each_edge(&edges_path, |edge| pool.submit(edge))?;
        (pool.finish()?, count)
    } else {
        let mut engine = SketchEngine::new(config.clone())?;
        let count = for_each_edge(&edges_path, |edge| {
            engine.apply_edge(&edge);
            Ok(())
        })?;
        (engine, count)
    };

    tracing::info!(
        edges = edge_count,
        streams = engine.stream_count(),
        shards,
        "sketching complete"
    );

    let snapshot = engine.snapshot();
    if let Some(path) = &output {
        let bytes = snapshot_to_bytes(&snapshot)?;
        std::fs::write(path, &bytes)
            .map_err(|e| StreamHashError::IoError(format!("Write file: {}", e)))?;
        tracing::info!(bytes = bytes.len(), path = %path.display(), "snapshot written");
    }

    if json_mode {
        let mut report = snapshot_json(&snapshot);
        report["edges"] = serde_json::json!(edge_count);
        print_json(&report);
        return Ok(());
    }

    println!("Edges:   {}", edge_count);
    print_snapshot(&snapshot, verbose);
    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Show a stored snapshot.
pub fn cmd_inspect(
    snapshot_path: &Path,
    json_mode: bool,
    verbose: bool,
) -> Result<(), StreamHashError> {
    let path = resolve_input(snapshot_path, Some(MAX_SNAPSHOT_SIZE as u64))?;

    let bytes = std::fs::read(&path)
        .map_err(|e| StreamHashError::IoError(format!("Read file: {}", e)))?;
    let snapshot = snapshot_from_bytes(&bytes)?;

    if json_mode {
        print_json(&snapshot_json(&snapshot));
        return Ok(());
    }

    println!("Snapshot: {}", path.display());
    print_snapshot(&snapshot, verbose);
    Ok(())
}

// =============================================================================
// SHINGLE COMMAND
// =============================================================================

/// Rebuild one node's shingle from an edge list.
pub fn cmd_shingle(
    config: &SketchConfig,
    edges_path: &Path,
    stream: u64,
    node: u64,
    node_type: char,
    json_mode: bool,
) -> Result<(), StreamHashError> {
    let node_type = u8::try_from(node_type)
        .ok()
        .filter(u8::is_ascii_graphic)
        .ok_or_else(|| {
            StreamHashError::InvalidConfig(format!(
                "node type must be a single printable ASCII character, got '{}'",
                node_type
            ))
        })?;
    let edges_path = resolve_input(edges_path, None)?;

    let stream = StreamId(stream);
    let mut engine = SketchEngine::new(config.clone())?;
    for_each_edge(&edges_path, |edge| {
        if edge.stream_id == stream {
            engine.apply_edge(&edge);
        }
        Ok(())
    })?;

    let key = NodeKey::new(NodeId(node), node_type);
    let shingle = engine.node_shingle(stream, key);
    let chunks: Vec<String> = shingle
        .as_deref()
        .map(|s| {
            partition_shingle(s, config.chunk_length)
                .into_iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect()
        })
        .unwrap_or_default();

    if json_mode {
        print_json(&serde_json::json!({
            "stream_id": stream.0,
            "node_id": node,
            "node_type": char::from(node_type).to_string(),
            "shingle": shingle.as_deref().map(|s| String::from_utf8_lossy(s).into_owned()),
            "chunks": chunks,
        }));
        return Ok(());
    }

    match shingle {
        Some(shingle) => {
            println!("Shingle: {:?}", String::from_utf8_lossy(&shingle));
            println!("Chunks:  {:?}", chunks);
        }
        None => println!(
            "Node {} ({}) has no outgoing edges in stream {}",
            node,
            char::from(node_type),
            stream
        ),
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
