//! Info command implementation.
//!
//! Parses map files and prints a summary plus the display grid for each
//! map they contain.

use std::path::PathBuf;

use clap::Args;

use crate::error::Result;

/// Summarize maps and print their display grids
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Map files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Skip the rendered display grid
    #[arg(long)]
    pub no_grid: bool,
}

pub fn run(args: InfoArgs) -> Result<()> {
    for file in &args.files {
        let registry = super::load_registry(file)?;

        for map in registry.maps() {
            let (width, height) = map.size();
            println!(
                "{}: {} node(s), {}x{} cells",
                map.name(),
                map.node_count(),
                width,
                height
            );
            if !args.no_grid {
                println!("{}", map.display_string());
                println!();
            }
        }
    }
    Ok(())
}
