
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{compose, export, fetch, inspect};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Fetch(args) => fetch::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
        Commands::Compose(args) => compose::run(&cli, args),
        Commands::Export(args) => export::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
