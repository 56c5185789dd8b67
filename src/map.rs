//! The parsed map: construction pipeline and the query surface.
//!
//! [`WorldMap::parse`] runs the whole pipeline: grid scan, auto-routing
//! direction resolution, teleporter pairing, per-node chain resolution,
//! display-matrix build, and the rooms-table bijection check. The result is
//! immutable; re-parsing replaces it wholesale, so derived pathfinding data
//! can never go stale.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{GridwayError, Result};
use crate::parser::grid::{parse_grid, ParsedGrid};
use crate::pathfind::{self, PathCache, PathData, PathElement};
use crate::render::{self, ViewOptions};
use crate::resolve::{self, GridRef, PendingTransition};
use crate::types::link::{EmptyTarget, MapLink};
use crate::types::node::{MapNode, ResolvedExit};
use crate::types::{GridCoord, Legend, WorldCoord};

/// Construction parameters for one map.
#[derive(Debug)]
pub struct MapConfig {
    /// Map identity; keys registry lookups and the path cache.
    pub name: String,
    /// Raw multi-line ASCII map text.
    pub text: String,
    /// Symbol -> behavior registry (standard legend by default).
    pub legend: Legend,
    /// Optional world coordinate -> prototype table; when present it must
    /// match the parsed nodes exactly.
    pub rooms: Option<HashMap<WorldCoord, String>>,
}

impl MapConfig {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            legend: Legend::standard(),
            rooms: None,
        }
    }

    pub fn with_legend(mut self, legend: Legend) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_rooms(mut self, rooms: HashMap<WorldCoord, String>) -> Self {
        self.rooms = rooms.into();
        self
    }
}

/// A fully parsed and resolved map.
#[derive(Debug)]
pub struct WorldMap {
    name: String,
    text: String,
    legend: Legend,
    nodes: Vec<MapNode>,
    links: HashMap<GridCoord, MapLink>,
    node_at: HashMap<GridCoord, usize>,
    by_world: HashMap<WorldCoord, usize>,
    display: Vec<Vec<char>>,
    width: usize,
    height: usize,
    pending: Vec<PendingTransition>,
    path_data: OnceLock<PathData>,
    cache: Option<PathCache>,
}

impl WorldMap {
    /// Parse a standalone map. Transition links require a registry and are
    /// rejected here.
    pub fn parse(config: MapConfig) -> Result<WorldMap> {
        let map = Self::parse_deferred(config)?;
        if let Some(pending) = map.pending.first() {
            return Err(GridwayError::Build {
                message: format!(
                    "Map '{}' contains a transition link to '{}'; load it through a MapRegistry",
                    map.name,
                    pending.target_map()
                ),
                help: Some("use MapRegistry::load to link maps together".to_string()),
            });
        }
        Ok(map)
    }

    /// Parse a map, leaving transition chains pending for registry linking.
    pub(crate) fn parse_deferred(config: MapConfig) -> Result<WorldMap> {
        let MapConfig {
            name,
            text,
            legend,
            rooms,
        } = config;

        let mut grid = parse_grid(&name, &text, &legend)?;
        let pending = resolve::resolve_grid(&mut grid, &name)?;

        if let Some(rooms) = &rooms {
            check_rooms(&name, rooms, &grid)?;
        }

        let ParsedGrid {
            nodes,
            links,
            node_at,
            by_world,
            width,
            height,
        } = grid;

        // The display matrix is built after resolution so auto-routing
        // links can render by their resolved orientation.
        let mut display = vec![vec![' '; width]; height];
        for node in &nodes {
            stamp(&mut display, node.grid(), node.display_symbol());
        }
        for link in links.values() {
            stamp(&mut display, link.coord(), link.display_symbol());
        }

        Ok(WorldMap {
            name,
            text,
            legend,
            nodes,
            links,
            node_at,
            by_world,
            display,
            width,
            height,
            pending,
            path_data: OnceLock::new(),
            cache: None,
        })
    }

    /// Attach a persisted path cache. Must happen before the first path
    /// query; the cache never changes results, only latency.
    pub fn set_path_cache(&mut self, cache: PathCache) {
        self.cache = Some(cache);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The legend this map was parsed with.
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Scan-region size in characters: (width, height).
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn nodes(&self) -> &[MapNode] {
        &self.nodes
    }

    /// Node at a world coordinate, if any.
    pub fn get_node(&self, coord: WorldCoord) -> Option<&MapNode> {
        self.by_world.get(&coord).map(|&index| &self.nodes[index])
    }

    /// Node by dense index.
    pub fn node(&self, index: usize) -> Option<&MapNode> {
        self.nodes.get(index)
    }

    /// Link at a grid cell, if any.
    pub fn link(&self, coord: GridCoord) -> Option<&MapLink> {
        self.links.get(&coord)
    }

    /// All placed links, in no particular order.
    pub fn links(&self) -> impl Iterator<Item = &MapLink> {
        self.links.values()
    }

    /// The display matrix, rows by ascending y.
    pub fn display(&self) -> &[Vec<char>] {
        &self.display
    }

    /// The display matrix as a printable top-down string.
    pub fn display_string(&self) -> String {
        self.display
            .iter()
            .rev()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lowest-total-weight route between two world coordinates.
    ///
    /// Returns direction names and the alternating node/link path. Both
    /// lists are empty when either coordinate has no node or no route
    /// exists; this is an expected outcome, not an error.
    pub fn get_shortest_path(
        &self,
        from: WorldCoord,
        to: WorldCoord,
    ) -> (Vec<String>, Vec<PathElement>) {
        let (Some(&start), Some(&end)) = (self.by_world.get(&from), self.by_world.get(&to))
        else {
            return (Vec::new(), Vec::new());
        };
        pathfind::shortest_path(&self.nodes, &self.links, self.path_data(), start, end)
    }

    /// Render a bounded view around a world coordinate. Rows ascend in y;
    /// see [`ViewOptions`] for modes and overlays.
    pub fn get_visual_range(&self, center: WorldCoord, options: &ViewOptions) -> Vec<Vec<char>> {
        render::visual_range(self, center, options)
    }

    /// Like [`get_visual_range`](Self::get_visual_range) but joined into a
    /// printable top-down string.
    pub fn get_visual_range_string(&self, center: WorldCoord, options: &ViewOptions) -> String {
        render::visual_range_string(self, center, options)
    }

    /// Shortest-path matrices, computed on first use and optionally backed
    /// by the persisted cache.
    fn path_data(&self) -> &PathData {
        self.path_data.get_or_init(|| {
            if let Some(cached) = self
                .cache
                .as_ref()
                .and_then(|cache| cache.load(&self.name, &self.text))
                .filter(|data| data.node_count() == self.nodes.len())
            {
                return cached;
            }
            let data = PathData::compute(&self.nodes);
            if let Some(cache) = &self.cache {
                // Failure to persist never affects query results.
                let _ = cache.store(&self.name, &self.text, &data);
            }
            data
        })
    }

    // --- registry hooks ---

    pub(crate) fn pending(&self) -> &[PendingTransition] {
        &self.pending
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn grid_ref(&self) -> GridRef<'_> {
        GridRef::new(&self.node_at, &self.links)
    }

    /// Cells of transition links carrying `symbol`.
    pub(crate) fn transition_partners(&self, symbol: char) -> Vec<GridCoord> {
        let mut coords: Vec<GridCoord> = self
            .links
            .values()
            .filter(|link| {
                link.symbol() == symbol
                    && matches!(link.empty_target(), EmptyTarget::Transition(_))
            })
            .map(|link| link.coord())
            .collect();
        coords.sort();
        coords
    }

    pub(crate) fn insert_remote_exit(&mut self, node: usize, exit: ResolvedExit) -> Result<()> {
        let Some(map_node) = self.nodes.get_mut(node) else {
            return Err(GridwayError::Build {
                message: format!("Map '{}': no node with index {}", self.name, node),
                help: None,
            });
        };
        let name = exit.name.clone();
        if !map_node.insert_exit(exit) {
            return Err(GridwayError::Topology {
                message: format!(
                    "Map '{}': node at {} has two exits that both resolve to direction '{}'",
                    self.name,
                    map_node.world(),
                    name
                ),
                help: None,
            });
        }
        Ok(())
    }
}

fn stamp(display: &mut [Vec<char>], coord: GridCoord, symbol: char) {
    if coord.x < 0 || coord.y < 0 {
        return;
    }
    let (x, y) = (coord.x as usize, coord.y as usize);
    if let Some(row) = display.get_mut(y) {
        if let Some(cell) = row.get_mut(x) {
            *cell = symbol;
        }
    }
}

/// Verify the rooms table and the parsed nodes agree exactly.
fn check_rooms(
    name: &str,
    rooms: &HashMap<WorldCoord, String>,
    grid: &ParsedGrid,
) -> Result<()> {
    for coord in rooms.keys() {
        if !grid.by_world.contains_key(coord) {
            return Err(GridwayError::Parse {
                message: format!(
                    "Map '{}': rooms table names {} but the grid has no node there",
                    name, coord
                ),
                help: Some("every rooms entry must match a node on the map".to_string()),
            });
        }
    }
    for coord in grid.by_world.keys() {
        if !rooms.contains_key(coord) {
            return Err(GridwayError::Parse {
                message: format!(
                    "Map '{}': node at {} has no rooms entry",
                    name, coord
                ),
                help: Some("add a prototype for every node, or drop the rooms table".to_string()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SQUARE: &str = "\
+ 0 1

1 #-#
  | |
0 #-#
+ 0 1";

    #[test]
    fn test_parse_and_lookup() {
        let map = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();

        assert_eq!(map.node_count(), 4);
        assert!(map.get_node(WorldCoord::new(1, 1)).is_some());
        assert!(map.get_node(WorldCoord::new(5, 5)).is_none());
    }

    #[test]
    fn test_display_string_is_top_down() {
        let map = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();

        assert_eq!(map.display_string(), "#-#\n| |\n#-#");
    }

    #[test]
    fn test_shortest_path_square_scenario() {
        let map = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();

        let (directions, path) =
            map.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 1));

        assert!(directions == ["e", "n"] || directions == ["n", "e"]);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_shortest_path_to_missing_node_is_empty() {
        let map = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();

        let (directions, path) =
            map.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(9, 9));
        assert!(directions.is_empty());
        assert!(path.is_empty());
    }

    #[test]
    fn test_rooms_bijection_accepts_exact_match() {
        let rooms: HashMap<WorldCoord, String> = [
            (WorldCoord::new(0, 0), "sw".to_string()),
            (WorldCoord::new(1, 0), "se".to_string()),
            (WorldCoord::new(0, 1), "nw".to_string()),
            (WorldCoord::new(1, 1), "ne".to_string()),
        ]
        .into_iter()
        .collect();

        let config = MapConfig::new("square", SQUARE).with_rooms(rooms);
        assert!(WorldMap::parse(config).is_ok());
    }

    #[test]
    fn test_rooms_bijection_rejects_extra_entry() {
        let rooms: HashMap<WorldCoord, String> =
            [(WorldCoord::new(7, 7), "ghost".to_string())].into_iter().collect();

        let config = MapConfig::new("square", SQUARE).with_rooms(rooms);
        assert!(WorldMap::parse(config).is_err());
    }

    #[test]
    fn test_rooms_bijection_rejects_missing_entry() {
        let rooms: HashMap<WorldCoord, String> =
            [(WorldCoord::new(0, 0), "sw".to_string())].into_iter().collect();

        let config = MapConfig::new("square", SQUARE).with_rooms(rooms);
        assert!(WorldMap::parse(config).is_err());
    }

    #[test]
    fn test_standalone_transition_is_rejected() {
        let legend = Legend::standard().with_link(std::sync::Arc::new(
            crate::types::TransitionLink::new('T', "elsewhere"),
        ));
        let config = MapConfig::new("border", "+ 0 1\n\n0 #-T\n+ 0 1").with_legend(legend);

        let err = WorldMap::parse(config);
        assert!(matches!(err, Err(GridwayError::Build { .. })));
    }

    #[test]
    fn test_reparse_reflects_edited_text() {
        let before = WorldMap::parse(MapConfig::new("town", "+ 0 1\n\n0 #-#\n+ 0 1")).unwrap();
        let (directions, _) =
            before.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 0));
        assert_eq!(directions, vec!["e".to_string()]);

        // One character changed: the link becomes a blocked link.
        let after = WorldMap::parse(MapConfig::new("town", "+ 0 1\n\n0 #b#\n+ 0 1")).unwrap();
        let (directions, path) =
            after.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 0));
        assert!(directions.is_empty());
        assert!(path.is_empty());
    }

    #[test]
    fn test_path_cache_never_serves_stale_results() {
        let dir = tempfile::tempdir().unwrap();

        let mut before = WorldMap::parse(MapConfig::new("town", "+ 0 1\n\n0 #-#\n+ 0 1")).unwrap();
        before.set_path_cache(PathCache::new(dir.path()));
        let (directions, _) =
            before.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 0));
        assert_eq!(directions.len(), 1);

        // Same name, same cache directory, different text: the stored
        // entry must be ignored and recomputed.
        let mut after = WorldMap::parse(MapConfig::new("town", "+ 0 1\n\n0 #b#\n+ 0 1")).unwrap();
        after.set_path_cache(PathCache::new(dir.path()));
        let (directions, _) =
            after.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 0));
        assert!(directions.is_empty());
    }

    #[test]
    fn test_path_cache_round_trip_matches_computation() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();
        first.set_path_cache(PathCache::new(dir.path()));
        let fresh = first.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 1));

        let mut second = WorldMap::parse(MapConfig::new("square", SQUARE)).unwrap();
        second.set_path_cache(PathCache::new(dir.path()));
        let cached = second.get_shortest_path(WorldCoord::new(0, 0), WorldCoord::new(1, 1));

        assert_eq!(fresh, cached);
    }
}
