//! Path command implementation.
//!
//! Answers a single shortest-path query against a map file.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::Result;
use crate::pathfind::{PathCache, PathElement};
use crate::types::WorldCoord;

/// Compute the shortest path between two world coordinates
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Map file to query
    pub file: PathBuf,

    /// Start world coordinate (X,Y)
    pub from: WorldCoord,

    /// End world coordinate (X,Y)
    pub to: WorldCoord,

    /// Map name, when the file contains more than one
    #[arg(long)]
    pub map: Option<String>,

    /// Directory for the persisted path cache
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PathOutput<'a> {
    map: &'a str,
    from: WorldCoord,
    to: WorldCoord,
    directions: &'a [String],
    path: &'a [PathElement],
}

pub fn run(args: PathArgs) -> Result<()> {
    let mut registry = super::load_registry(&args.file)?;
    if let Some(dir) = &args.cache_dir {
        registry.set_path_cache(&PathCache::new(dir));
    }
    let map = super::select_map(&registry, args.map.as_deref(), &args.file)?;

    let (directions, path) = map.get_shortest_path(args.from, args.to);

    if args.json {
        let output = PathOutput {
            map: map.name(),
            from: args.from,
            to: args.to,
            directions: &directions,
            path: &path,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    if path.is_empty() {
        println!("No route from {} to {} on '{}'", args.from, args.to, map.name());
        return Ok(());
    }
    if directions.is_empty() {
        println!("Already at {} on '{}'", args.from, map.name());
        return Ok(());
    }

    println!(
        "{} step(s) on '{}': {}",
        directions.len(),
        map.name(),
        directions.join(" ")
    );
    let stops: Vec<String> = path
        .iter()
        .filter_map(|element| match element {
            PathElement::Node(index) => map.node(*index).map(|node| node.world().to_string()),
            PathElement::Link(_) => None,
        })
        .collect();
    println!("via {}", stops.join(" -> "));
    Ok(())
}
