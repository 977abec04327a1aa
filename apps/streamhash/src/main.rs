//! # streamhash
//!
//! Command-line front end for the streamhash sketch engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              apps/streamhash (THE BINARY)        │
//! │                                                  │
//! │   edge file ──► CLI (clap) ──► snapshot file     │
//! │                     │                            │
//! │                     ▼                            │
//! │             ┌─────────────────┐                  │
//! │             │ streamhash-core │                  │
//! │             │   (THE LOGIC)   │                  │
//! │             └─────────────────┘                  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Sketch an edge list and keep the result
//! streamhash run --edges edges.txt --output sketches.bin --shards 4
//!
//! # Look at a stored snapshot
//! streamhash inspect --snapshot sketches.bin
//!
//! # Rebuild one node's shingle
//! streamhash shingle --edges edges.txt --stream 3 --node 17 --node-type a
//! ```

use clap::Parser;
use streamhash::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // STREAMHASH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STREAMHASH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "streamhash=debug,streamhash_core=debug"
    } else {
        "streamhash=info,streamhash_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
