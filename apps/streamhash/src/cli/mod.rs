//! # streamhash CLI Module
//!
//! This module implements the CLI interface for streamhash.
//!
//! ## Available Commands
//!
//! - `run` - Sketch an edge list, optionally writing a snapshot
//! - `inspect` - Show the contents of a snapshot
//! - `shingle` - Rebuild one node's shingle from an edge list

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use streamhash_core::StreamHashError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// streamhash - decayed shingle sketches for streams of typed edges
///
/// Every stream in the input gets a fixed-width binary sketch summarising
/// the local structure of its nodes, weighted towards recent edges.
#[derive(Parser, Debug)]
#[command(name = "streamhash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML file with sketch parameters
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the chunk width
    #[arg(long, global = true)]
    pub chunk_length: Option<usize>,

    /// Override the number of sketch bits
    #[arg(long, global = true)]
    pub sketch_width: Option<usize>,

    /// Override the per-chunk decay factor
    #[arg(long, global = true)]
    pub decay_rate: Option<f64>,

    /// Override the hash key seed
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Override the chunk policy (symmetric, add-only)
    #[arg(long, global = true)]
    pub policy: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sketch every stream of an edge list
    Run {
        /// Path to the edge list
        #[arg(short, long)]
        edges: PathBuf,

        /// Write a snapshot of the projections to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of worker threads; streams are split by id
        #[arg(short, long)]
        shards: Option<usize>,
    },

    /// Show the sketches stored in a snapshot
    Inspect {
        /// Path to the snapshot file
        #[arg(short = 'S', long)]
        snapshot: PathBuf,
    },

    /// Rebuild one node's shingle and its chunks
    Shingle {
        /// Path to the edge list
        #[arg(short, long)]
        edges: PathBuf,

        /// Stream the node belongs to
        #[arg(long)]
        stream: u64,

        /// Node id
        #[arg(long)]
        node: u64,

        /// Node type label (one ASCII character)
        #[arg(long)]
        node_type: char,
    },
}

impl Cli {
    /// Command-line overrides for the sketch parameters.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            chunk_length: self.chunk_length,
            sketch_width: self.sketch_width,
            decay_rate: self.decay_rate,
            seed: self.seed,
            policy: self.policy.clone(),
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StreamHashError> {
    let settings = load_settings(cli.config.as_deref(), &cli.overrides())?;
    let json = cli.json;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Run {
            edges,
            output,
            shards,
        } => {
            let shards = shards.or(settings.shards).unwrap_or(1);
            cmd_run(
                &settings.sketch,
                &edges,
                output.as_deref(),
                shards,
                json,
                verbose,
            )
        }
        Commands::Inspect { snapshot } => cmd_inspect(&snapshot, json, verbose),
        Commands::Shingle {
            edges,
            stream,
            node,
            node_type,
        } => cmd_shingle(&settings.sketch, &edges, stream, node, node_type, json),
    }
}
