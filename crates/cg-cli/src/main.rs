use anyhow::{Context, Result};
use clap::Parser;

use cg_cli::commands::convert;
use cg_cli::{Cli, Config, init_tracing};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    convert::run(&cli.convert, &config, &mut stdout.lock())
}
