//! Generate command: writes a seeded synthetic log.

use std::io::Write;

use anyhow::{Context, Result};

use cg_core::{GeneratorConfig, generate};

use crate::cli::GenerateArgs;

/// Generate the log described by `args` and write a one-line summary to `out`.
///
/// Without `--seed` a random seed is used. It is logged and printed, so the
/// run can be repeated.
pub fn run<W: Write>(args: &GenerateArgs, out: &mut W) -> Result<()> {
    let config = GeneratorConfig {
        processes: args.processes,
        events: args.events,
        ratio: args.ratio,
        seed: args.seed.unwrap_or_else(rand::random),
        variation: args.vary.map(Into::into),
    };

    let log = generate(&config).context("failed to generate log")?;
    tracing::info!(
        seed = log.config.seed,
        processes = log.config.processes,
        events = log.events.len(),
        messages = log.messages.len(),
        "generated log"
    );

    std::fs::write(&args.output, log.to_string())
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    writeln!(
        out,
        "Wrote {} events ({} messages across {} processes, seed {}) to {}",
        log.events.len(),
        log.messages.len(),
        log.config.processes,
        log.config.seed,
        args.output.display()
    )?;
    Ok(())
}
