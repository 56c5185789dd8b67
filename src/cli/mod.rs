pub mod completions;
pub mod info;
pub mod path;
pub mod validate;
pub mod view;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::{GridwayError, Result};
use crate::map::{MapConfig, WorldMap};
use crate::registry::MapRegistry;

/// gridway - ASCII grid map parser and pathfinder
#[derive(Parser, Debug)]
#[command(name = "gridway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize maps and print their display grids
    Info(info::InfoArgs),

    /// Compute the shortest path between two world coordinates
    Path(path::PathArgs),

    /// Render a bounded view around a world coordinate
    View(view::ViewArgs),

    /// Validate map files without querying
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Read a map file into configurations.
pub(crate) fn read_configs(file: &Path) -> Result<Vec<MapConfig>> {
    let source = std::fs::read_to_string(file).map_err(|e| GridwayError::Io {
        path: file.to_path_buf(),
        message: format!("Failed to read map file: {}", e),
    })?;
    crate::parser::parse_map_file(&source)
}

/// Load a whole map file as a registry, so same-file transitions link up.
pub(crate) fn load_registry(file: &Path) -> Result<MapRegistry> {
    MapRegistry::load(read_configs(file)?)
}

/// Pick one map out of a loaded registry, honoring `--map`.
pub(crate) fn select_map<'a>(
    registry: &'a MapRegistry,
    name: Option<&str>,
    file: &Path,
) -> Result<&'a WorldMap> {
    match name {
        Some(wanted) => registry.get(wanted).ok_or_else(|| GridwayError::Build {
            message: format!("No map named '{}' in {}", wanted, file.display()),
            help: Some(format!(
                "available maps: {}",
                registry.names().collect::<Vec<_>>().join(", ")
            )),
        }),
        None => {
            let mut maps = registry.maps();
            match (maps.next(), maps.next()) {
                (Some(single), None) => Ok(single),
                (Some(_), Some(_)) => Err(GridwayError::Build {
                    message: format!(
                        "{} contains {} maps; pick one with --map",
                        file.display(),
                        registry.len()
                    ),
                    help: Some(format!(
                        "available maps: {}",
                        registry.names().collect::<Vec<_>>().join(", ")
                    )),
                }),
                (None, _) => Err(GridwayError::Build {
                    message: format!("{} contains no maps", file.display()),
                    help: None,
                }),
            }
        }
    }
}
