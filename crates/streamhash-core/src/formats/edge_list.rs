//! # Edge List Format
//!
//! One edge per line, six whitespace-separated fields:
//!
//! ```text
//! source_id source_type dest_id dest_type edge_type stream_id
//! ```
//!
//! Ids are unsigned integers; each type field is exactly one ASCII graphic
//! byte. Blank lines and lines starting with `#` are skipped.

use crate::primitives::MAX_EDGE_LINE_LENGTH;
use crate::types::{Edge, NodeId, StreamHashError, StreamId};

/// Parse one edge record. `line_no` is only used for error reporting.
pub fn parse_edge_line(line: &str, line_no: usize) -> Result<Edge, StreamHashError> {
    let invalid = |reason: String| StreamHashError::InvalidEdge {
        line: line_no,
        reason,
    };

    if line.len() > MAX_EDGE_LINE_LENGTH {
        return Err(invalid(format!(
            "line is {} bytes, limit is {}",
            line.len(),
            MAX_EDGE_LINE_LENGTH
        )));
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[source_id, source_type, dest_id, dest_type, edge_type, stream_id] = fields.as_slice() else {
        return Err(invalid(format!("expected 6 fields, found {}", fields.len())));
    };

    let id = |field: &str, name: &str| {
        field
            .parse::<u64>()
            .map_err(|e| invalid(format!("{} '{}': {}", name, field, e)))
    };
    let label = |field: &str, name: &str| match field.as_bytes() {
        [b] if b.is_ascii_graphic() => Ok(*b),
        _ => Err(invalid(format!(
            "{} must be a single printable ASCII character, got '{}'",
            name, field
        ))),
    };

    Ok(Edge {
        source_id: NodeId(id(source_id, "source_id")?),
        source_type: label(source_type, "source_type")?,
        dest_id: NodeId(id(dest_id, "dest_id")?),
        dest_type: label(dest_type, "dest_type")?,
        edge_type: label(edge_type, "edge_type")?,
        stream_id: StreamId(id(stream_id, "stream_id")?),
    })
}

/// Parse a whole edge list, skipping blank and comment lines.
///
/// Stops at the first malformed record.
pub fn parse_edge_list(text: &str) -> Result<Vec<Edge>, StreamHashError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(i, line)| parse_edge_line(line, i + 1))
        .collect()
}

/// Render an edge as an edge-list record.
pub fn format_edge_line(edge: &Edge) -> String {
    format!(
        "{} {} {} {} {} {}",
        edge.source_id.0,
        char::from(edge.source_type),
        edge.dest_id.0,
        char::from(edge.dest_type),
        char::from(edge.edge_type),
        edge.stream_id.0
    )
}
