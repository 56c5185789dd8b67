//! Validate command implementation.
//!
//! Parses map files (or directories of them), links them as one registry,
//! and reports construction errors plus validation warnings.

use std::path::PathBuf;

use clap::Args;
use walkdir::WalkDir;

use crate::error::{GridwayError, Result};
use crate::map::MapConfig;
use crate::registry::MapRegistry;
use crate::validation::{print_diagnostics, validate_registry, ValidationResult};

/// Validate map files without querying
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Map files or directories to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let mut result = ValidationResult::new();
    let mut configs: Vec<MapConfig> = Vec::new();

    for file in collect_files(&args.paths) {
        match super::read_configs(&file) {
            Ok(parsed) => configs.extend(parsed),
            Err(e) => result.error(
                "gridway::validate::parse",
                format!("{}: {}", file.display(), e),
            ),
        }
    }

    match MapRegistry::load(configs) {
        Ok(registry) => result.merge(validate_registry(&registry)),
        Err(e) => result.error("gridway::validate::construction", e.to_string()),
    }

    print_diagnostics(&result);

    if result.has_errors() {
        return Err(GridwayError::Build {
            message: format!("Validation failed with {} error(s)", result.error_count()),
            help: None,
        });
    }
    Ok(())
}

/// Expand directories into their `*.map.md` files; keep files as given.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.ends_with(".map.md"))
                })
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}
