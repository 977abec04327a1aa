//! # streamhash
//!
//! Library half of the `streamhash` binary. Exposes the CLI so integration
//! tests can drive commands without spawning a process.

pub mod cli;
