//! # Core Type Definitions
//!
//! This module contains the core types for the streamhash engine:
//! - Stream and node identifiers (`StreamId`, `NodeId`, `NodeKey`)
//! - Edge representation (`Edge`, `OutEdge`)
//! - Error types (`StreamHashError`)
//!
//! Type labels (`source_type`, `dest_type`, `edge_type`) are single bytes.
//! They are the characters a node's shingle is spelled with.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of one logical edge stream (one graph among many interleaved).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct StreamId(pub u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a node inside a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// A node is addressed by its id together with its type label.
///
/// The same numeric id under two different types is two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub id: NodeId,
    pub node_type: u8,
}

impl NodeKey {
    #[must_use]
    pub const fn new(id: NodeId, node_type: u8) -> Self {
        Self { id, node_type }
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// An edge as it arrives on the wire.
///
/// Edges of one stream arrive in temporal order; streams interleave freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: NodeId,
    pub source_type: u8,
    pub dest_id: NodeId,
    pub dest_type: u8,
    pub edge_type: u8,
    pub stream_id: StreamId,
}

impl Edge {
    /// The key of the node this edge leaves from.
    #[must_use]
    pub const fn source(&self) -> NodeKey {
        NodeKey::new(self.source_id, self.source_type)
    }

    /// The history entry this edge appends to its source node.
    #[must_use]
    pub const fn out_edge(&self) -> OutEdge {
        OutEdge {
            dest_id: self.dest_id,
            dest_type: self.dest_type,
            edge_type: self.edge_type,
        }
    }
}

/// One entry of a node's outgoing-edge history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutEdge {
    pub dest_id: NodeId,
    pub dest_type: u8,
    pub edge_type: u8,
}

impl OutEdge {
    #[must_use]
    pub const fn new(dest_id: NodeId, dest_type: u8, edge_type: u8) -> Self {
        Self {
            dest_id,
            dest_type,
            edge_type,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in streamhash.
///
/// Configuration and key problems surface once, at construction time.
/// Applying an edge to a constructed engine never fails.
#[derive(Debug, Error)]
pub enum StreamHashError {
    /// A sketch parameter is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The hash key matrix does not fit the configured sketch.
    #[error("Invalid hash keys: {0}")]
    InvalidKeys(String),

    /// An edge record could not be parsed.
    #[error("Invalid edge on line {line}: {reason}")]
    InvalidEdge { line: usize, reason: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A shard worker stopped accepting edges.
    #[error("Shard {0} is no longer accepting edges")]
    ShardUnavailable(usize),

    /// A shard worker thread panicked.
    #[error("Shard {0} worker panicked")]
    ShardPanicked(usize),
}

// =============================================================================
// TESTS
// =============================================================================
