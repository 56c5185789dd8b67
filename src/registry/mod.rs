//! Multi-map coordinator.
//!
//! Holds a named collection of parsed maps and completes cross-map
//! transition links: each pending transition is matched against the one
//! same-symbol transition link on its target map, and the chain walk
//! continues on the target grid to its destination node. Pathfinding and
//! rendering never span maps; this module only does name -> map lookup and
//! transition linking.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{GridwayError, Result};
use crate::map::{MapConfig, WorldMap};
use crate::parser::parse_map_file;
use crate::resolve::{chain_weight, walk_into_link, ChainEnd};
use crate::types::node::{ExitTarget, ResolvedExit};

/// Named collection of linked maps.
///
/// Immutable after construction; reload the registry to pick up edits.
#[derive(Debug)]
pub struct MapRegistry {
    maps: BTreeMap<String, WorldMap>,
}

impl MapRegistry {
    /// Parse all configurations, then link transitions between them.
    pub fn load(configs: Vec<MapConfig>) -> Result<MapRegistry> {
        let mut maps = BTreeMap::new();
        for config in configs {
            let name = config.name.clone();
            if maps.contains_key(&name) {
                return Err(GridwayError::Build {
                    message: format!("Duplicate map name '{}'", name),
                    help: Some("map names must be unique within a registry".to_string()),
                });
            }
            maps.insert(name, WorldMap::parse_deferred(config)?);
        }

        link_transitions(&mut maps)?;
        Ok(MapRegistry { maps })
    }

    /// Discover `*.map.md` files under a directory and load them all.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<MapRegistry> {
        let mut files: Vec<_> = WalkDir::new(path.as_ref())
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
        files.sort();

        let mut configs = Vec::new();
        for file in files {
            let source = fs::read_to_string(&file).map_err(|e| GridwayError::Io {
                path: file.clone(),
                message: format!("Failed to read map file: {}", e),
            })?;
            configs.extend(parse_map_file(&source)?);
        }
        Self::load(configs)
    }

    /// Attach a persisted path cache to every map in the registry.
    pub fn set_path_cache(&mut self, cache: &crate::pathfind::PathCache) {
        for map in self.maps.values_mut() {
            map.set_path_cache(cache.clone());
        }
    }

    /// Look up a map by name.
    pub fn get(&self, name: &str) -> Option<&WorldMap> {
        self.maps.get(name)
    }

    /// Map names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(|name| name.as_str())
    }

    /// All maps in name order.
    pub fn maps(&self) -> impl Iterator<Item = &WorldMap> {
        self.maps.values()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Resolve every pending transition read-only, then apply the finished
/// exits. Keeps in-flight maps consistent: nothing is written until all
/// lookups succeed.
fn link_transitions(maps: &mut BTreeMap<String, WorldMap>) -> Result<()> {
    struct Finished {
        map: String,
        node: usize,
        exit: ResolvedExit,
    }

    let mut finished = Vec::new();

    for (name, map) in maps.iter() {
        for pending in map.pending() {
            let target_name = pending.target_map();
            let Some(target) = maps.get(target_name) else {
                return Err(GridwayError::Build {
                    message: format!(
                        "Map '{}': transition '{}' at {} references unknown map '{}'",
                        name, pending.symbol, pending.via, target_name
                    ),
                    help: Some("load the target map in the same registry".to_string()),
                });
            };

            let mut partners = target.transition_partners(pending.symbol);
            if target_name == name.as_str() {
                partners.retain(|&coord| coord != pending.via);
            }
            if partners.len() != 1 {
                return Err(GridwayError::Topology {
                    message: format!(
                        "Map '{}': transition '{}' at {} needs exactly one partner on map \
                         '{}', found {}",
                        name,
                        pending.symbol,
                        pending.via,
                        target_name,
                        partners.len()
                    ),
                    help: Some(
                        "place exactly one matching transition link on the target map"
                            .to_string(),
                    ),
                });
            }

            // Continue the chain on the target grid, entering the partner
            // link with the same travel direction.
            let outcome =
                walk_into_link(&target.grid_ref(), partners[0], pending.travel, target_name)?;
            match outcome.end {
                ChainEnd::Local(index) => {
                    let coord = target.nodes()[index].world();
                    let mut weights = pending.weights.clone();
                    weights.extend(outcome.weights);
                    let average = pending.average && outcome.average;

                    finished.push(Finished {
                        map: name.clone(),
                        node: pending.node,
                        exit: ResolvedExit {
                            name: pending.name.clone(),
                            start: pending.start,
                            target: ExitTarget::Remote {
                                map: target_name.to_string(),
                                coord,
                            },
                            weight: chain_weight(&weights, average),
                            steps: pending.steps.clone(),
                        },
                    });
                }
                ChainEnd::Remote { .. } => {
                    return Err(GridwayError::Topology {
                        message: format!(
                            "Map '{}': transition '{}' at {} chains into another transition \
                             on map '{}'",
                            name, pending.symbol, pending.via, target_name
                        ),
                        help: Some("chained cross-map transitions are not supported".to_string()),
                    });
                }
            }
        }
    }

    for item in finished {
        if let Some(map) = maps.get_mut(&item.map) {
            map.insert_remote_exit(item.node, item.exit)?;
        }
    }
    for map in maps.values_mut() {
        map.clear_pending();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node::ExitTarget;
    use crate::types::{Legend, TransitionLink, WorldCoord};
    use std::sync::Arc;

    fn transition_legend(target: &str) -> Legend {
        Legend::standard().with_link(Arc::new(TransitionLink::new('T', target)))
    }

    fn two_map_configs() -> Vec<MapConfig> {
        vec![
            MapConfig::new("overworld", "+ 0 1 2\n\n0 #-#-T\n+ 0 1 2")
                .with_legend(transition_legend("underdark")),
            MapConfig::new("underdark", "+ 0 1\n\n0 T-#\n+ 0 1")
                .with_legend(transition_legend("overworld")),
        ]
    }

    #[test]
    fn test_registry_links_transitions() {
        let registry = MapRegistry::load(two_map_configs()).unwrap();

        let overworld = registry.get("overworld").unwrap();
        let border = overworld.get_node(WorldCoord::new(1, 0)).unwrap();
        let exit = border.exit("e").unwrap();

        assert_eq!(
            exit.target,
            ExitTarget::Remote {
                map: "underdark".to_string(),
                coord: WorldCoord::new(1, 0),
            }
        );
        // Local steps only: the '-' and the 'T' on this map.
        assert_eq!(exit.steps.len(), 2);
    }

    #[test]
    fn test_registry_links_both_directions() {
        let registry = MapRegistry::load(two_map_configs()).unwrap();

        let underdark = registry.get("underdark").unwrap();
        let back = underdark.get_node(WorldCoord::new(1, 0)).unwrap();
        let exit = back.exit("w").unwrap();

        assert!(matches!(
            &exit.target,
            ExitTarget::Remote { map, .. } if map == "overworld"
        ));
    }

    #[test]
    fn test_pathfinding_never_crosses_transitions() {
        let registry = MapRegistry::load(two_map_configs()).unwrap();
        let overworld = registry.get("overworld").unwrap();

        // Local routing still works up to the border node.
        let (directions, _) =
            overworld.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 0));
        assert_eq!(directions, vec!["e".to_string()]);

        // The remote node's coordinate is not on this map.
        let (directions, path) =
            overworld.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(2, 0));
        assert!(directions.is_empty());
        assert!(path.is_empty());
    }

    #[test]
    fn test_unknown_target_map_is_fatal() {
        let configs = vec![MapConfig::new("overworld", "+ 0 1\n\n0 #-T\n+ 0 1")
            .with_legend(transition_legend("nowhere"))];

        let err = MapRegistry::load(configs);
        assert!(matches!(err, Err(GridwayError::Build { .. })));
    }

    #[test]
    fn test_missing_partner_is_fatal() {
        let configs = vec![
            MapConfig::new("overworld", "+ 0 1\n\n0 #-T\n+ 0 1")
                .with_legend(transition_legend("underdark")),
            // No transition link on the target map.
            MapConfig::new("underdark", "+ 0 1\n\n0 #-#\n+ 0 1"),
        ];

        let err = MapRegistry::load(configs);
        assert!(matches!(err, Err(GridwayError::Topology { .. })));
    }

    #[test]
    fn test_two_partners_is_fatal() {
        let configs = vec![
            MapConfig::new("overworld", "+ 0 1\n\n0 #-T\n+ 0 1")
                .with_legend(transition_legend("underdark")),
            MapConfig::new("underdark", "+ 0 1 2\n\n2 T-#\n\n0 T-#\n+ 0 1 2")
                .with_legend(transition_legend("overworld")),
        ];

        let err = MapRegistry::load(configs);
        assert!(matches!(err, Err(GridwayError::Topology { .. })));
    }

    #[test]
    fn test_duplicate_map_names_are_fatal() {
        let configs = vec![
            MapConfig::new("town", "+ 0\n\n0 #\n+ 0"),
            MapConfig::new("town", "+ 0\n\n0 #\n+ 0"),
        ];

        let err = MapRegistry::load(configs);
        assert!(matches!(err, Err(GridwayError::Build { .. })));
    }

    #[test]
    fn test_from_dir_discovers_map_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("town.map.md"),
            "---\nname: town\n---\n\n```map\n+ 0 1\n\n0 #-#\n+ 0 1\n```\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a map").unwrap();

        let registry = MapRegistry::from_dir(dir.path()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("town").is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["town"]);
    }
}
