//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use cg_core::Variation;

/// Reconstruct the causal graph of a distributed execution.
///
/// Reads a log whose entries carry vector-clock timestamps and writes a JSON
/// graph of hosts and the causal links between them.
#[derive(Debug, Parser)]
#[command(name = "cg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub convert: ConvertArgs,
}

/// What to convert and where the graph goes.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Regular expression with `host`, `clock` and `event` named groups,
    /// e.g. `(?<host>\S*) (?<clock>{.*})\n(?<event>.*)`.
    pub pattern: String,

    /// Log file to convert.
    pub log_file: PathBuf,

    /// Write the graph here instead of `<log name>.json`.
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the graph to stdout instead of a file.
    #[arg(long)]
    pub stdout: bool,
}

/// Generate a synthetic ShiViz log with vector-clock timestamps.
///
/// Processes exchange messages and record local events; the log starts with
/// the pattern that parses it.
#[derive(Debug, Parser)]
#[command(name = "cg-gen", version, about, long_about = None)]
pub struct GenCli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Shape of the generated run.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// File to write the log to.
    pub output: PathBuf,

    /// Number of processes.
    #[arg(short, long, default_value_t = 4)]
    pub processes: usize,

    /// Number of events, initialization included.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub events: usize,

    /// Share of events that are message sends or receives, 0 to 1.
    #[arg(short, long, default_value_t = 0.5)]
    pub ratio: f64,

    /// Seed for reproducible runs. Random when omitted.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Draw one parameter at random instead of using its flag.
    #[arg(long, value_enum)]
    pub vary: Option<Vary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Vary {
    /// Ratio in tenths, 0.1 to 1.0.
    Ratio,
    /// 2 to 24 processes.
    Processes,
    /// 6000 to 12000 events.
    Events,
}

impl From<Vary> for Variation {
    fn from(vary: Vary) -> Self {
        match vary {
            Vary::Ratio => Self::Ratio,
            Vary::Processes => Self::Processes,
            Vary::Events => Self::Events,
        }
    }
}
