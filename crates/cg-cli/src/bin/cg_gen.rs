use anyhow::Result;
use clap::Parser;

use cg_cli::commands::generate;
use cg_cli::{GenCli, init_tracing};

fn main() -> Result<()> {
    let cli = GenCli::parse();
    init_tracing(cli.verbose);

    let stdout = std::io::stdout();
    generate::run(&cli.generate, &mut stdout.lock())
}
