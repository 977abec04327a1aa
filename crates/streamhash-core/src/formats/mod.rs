//! # Formats Module
//!
//! Text and binary formats at the edge of the engine.
//!
//! - `edge_list`: whitespace-separated edge records, one per line
//! - `snapshot`: header + postcard-encoded projections
//!
//! File I/O itself lives in the app layer.

mod edge_list;
mod snapshot;

pub use edge_list::*;
pub use snapshot::*;
