use clap::Parser;
use miette::Result;

use gridway::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => gridway::cli::info::run(args)?,
        Commands::Path(args) => gridway::cli::path::run(args)?,
        Commands::View(args) => gridway::cli::view::run(args)?,
        Commands::Validate(args) => gridway::cli::validate::run(args)?,
        Commands::Completions(args) => gridway::cli::completions::run(args)?,
    }

    Ok(())
}
