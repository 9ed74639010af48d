//! Causal graph CLI library.
//!
//! This crate provides the CLI interface for converting vector-clock logs
//! (`cg`) and for generating synthetic ones (`cg-gen`).

mod cli;
pub mod commands;
mod config;

use tracing_subscriber::EnvFilter;

pub use cli::{Cli, ConvertArgs, GenCli, GenerateArgs, Vary};
pub use config::Config;

/// Sends logs to stderr, at debug level when `verbose`, else per `RUST_LOG`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
