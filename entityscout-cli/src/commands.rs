//! Top-level CLI definition

use crate::args::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "entityscout-cli")]
#[command(about = "Score, enrich and relate extracted entities", long_about = None)]
#[command(version = entityscout::VERSION)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, short, default_value = "table", global = true)]
    pub output: String,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display version information
    Version,

    /// Run the pipeline over a file of raw entities
    Process(ProcessArgs),

    /// Extract entities with TextRazor, then run the pipeline
    Analyze(AnalyzeArgs),

    /// Summarize a file of raw entities after processing
    Stats(StatsArgs),
}

/// Default log filter when `RUST_LOG` is unset. JSON output keeps stderr quiet.
pub fn log_directive(quiet: bool, verbose: bool, output_format: &str) -> &'static str {
    if quiet || output_format == "json" {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}
