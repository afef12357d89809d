//! # CLI Module - Command Line Interface for the Simulation Pipeline
//!
//! This module provides the command-line surface of the simulator:
//!
//! ## `run`
//!
//! Runs a simulation script from a TOML options file, streaming snapshots
//! to a binary sink for downstream consumers (the viewer, analysis tools)
//! and optionally writing a JSON run report.
//!
//! **Usage**:
//! ```bash
//! demsim-rs run --config crunch.toml --output ./data/snapshots/crunch.bin \
//!     --report ./data/reports/crunch.json
//! ```
//!
//! ## `print-config`
//!
//! Prints the default options as a TOML document, which is the easiest way
//! to start a new options file: redirect, then edit the script section.
//!
//! **Usage**:
//! ```bash
//! demsim-rs print-config > options.toml
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=info` to see stage
//! progress and the end-of-run time-error report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a simulation script from a TOML options file
    Run {
        /// Path of the options file
        #[arg(short, long)]
        config: PathBuf,

        /// Path of the binary snapshot stream to write
        #[arg(short, long, default_value = "./data/snapshots/run.bin")]
        output: PathBuf,

        /// Path of the JSON run report to write
        #[arg(long)]
        report: Option<PathBuf>,

        /// Override the random seed from the options file
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the default options as TOML
    PrintConfig,
}
