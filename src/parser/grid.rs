//! Grid scanning: anchored map text -> placed nodes and links.
//!
//! A map text is anchored by two `+` corner markers sharing a column: one
//! top-left, one bottom-left. The world origin sits 2 characters right of
//! the marker column and 1 line above the bottom marker; the scan region
//! ends 2 lines below the top marker. Everything left of the origin column
//! (axis labels) and outside the region is ignored.
//!
//! ```text
//! + 0 1
//!
//! 1 #-#
//!   | |
//! 0 #-#
//! + 0 1
//! ```

use std::collections::HashMap;

use crate::error::{GridwayError, Result};
use crate::types::link::{CellKind, MapLink, Neighborhood};
use crate::types::node::MapNode;
use crate::types::{GridCoord, Legend, WorldCoord};

use crate::types::Compass;

/// The corner anchor glyph. Inside the scan region the same character is an
/// ordinary crossing link; the anchors are found positionally.
pub const CORNER_MARKER: char = '+';

/// A scanned map before link resolution.
#[derive(Debug)]
pub struct ParsedGrid {
    /// Nodes in index order (bottom-to-top, left-to-right scan order).
    pub nodes: Vec<MapNode>,
    /// Placed links by grid cell.
    pub links: HashMap<GridCoord, MapLink>,
    /// Node index by grid cell.
    pub node_at: HashMap<GridCoord, usize>,
    /// Node index by world coordinate.
    pub by_world: HashMap<WorldCoord, usize>,
    /// Scan-region width in characters (beyond the origin column).
    pub width: usize,
    /// Scan-region height in lines.
    pub height: usize,
}

impl ParsedGrid {
    /// Total number of placed cells; bounds chain walks.
    pub fn cell_count(&self) -> usize {
        self.nodes.len() + self.links.len()
    }

    /// Occupancy of the eight cells around a position.
    pub fn neighborhood(&self, coord: GridCoord) -> Neighborhood {
        let mut nb = Neighborhood::default();
        for dir in Compass::ALL {
            let cell = coord.step(dir);
            if self.node_at.contains_key(&cell) {
                nb.set(dir, CellKind::Node);
            } else if self.links.contains_key(&cell) {
                nb.set(dir, CellKind::Link);
            }
        }
        nb
    }
}

/// Scan map text into placed nodes and links.
///
/// Fails on missing/misaligned corner markers, unknown symbols, and nodes
/// on odd coordinates. Link resolution happens separately.
pub fn parse_grid(name: &str, text: &str, legend: &Legend) -> Result<ParsedGrid> {
    let lines: Vec<&str> = text.lines().collect();

    let (top_line, marker_col) = find_top_marker(&lines).ok_or_else(|| GridwayError::Parse {
        message: format!("Map '{}': missing top-left corner marker '+'", name),
        help: Some("Anchor the map with '+' markers sharing a column".to_string()),
    })?;

    let bottom_line =
        find_bottom_marker(&lines, top_line, marker_col).ok_or_else(|| GridwayError::Parse {
            message: format!(
                "Map '{}': missing bottom-left corner marker '+' below column {}",
                name, marker_col
            ),
            help: Some("Both corner markers must sit in the same column".to_string()),
        })?;

    let origin_col = marker_col + 2;
    let first_row = top_line + 2;
    let last_row = bottom_line - 1;

    let mut placements: Vec<(GridCoord, char)> = Vec::new();
    let mut links: HashMap<GridCoord, MapLink> = HashMap::new();
    let mut width = 0usize;

    for (line_idx, line) in lines
        .iter()
        .enumerate()
        .take(last_row + 1)
        .skip(first_row)
    {
        let y = (last_row - line_idx) as i32;
        let line_width = line.trim_end().chars().count().saturating_sub(origin_col);
        width = width.max(line_width);

        for (col, ch) in line.chars().enumerate() {
            if col < origin_col || ch.is_whitespace() {
                continue;
            }
            let coord = GridCoord::new((col - origin_col) as i32, y);

            if legend.node_kind(ch).is_some() {
                if !coord.is_even() {
                    return Err(GridwayError::Parse {
                        message: format!(
                            "Map '{}': node '{}' at {} must sit on even grid coordinates",
                            name, ch, coord
                        ),
                        help: Some(
                            "nodes occupy whole world coordinates; links fill the cells between"
                                .to_string(),
                        ),
                    });
                }
                placements.push((coord, ch));
            } else if let Some(kind) = legend.link_kind(ch) {
                links.insert(coord, MapLink::new(coord, ch, kind.clone()));
            } else {
                return Err(GridwayError::Parse {
                    message: format!("Map '{}': unknown map symbol '{}' at {}", name, ch, coord),
                    help: Some("add the symbol to the legend section".to_string()),
                });
            }
        }
    }

    // Assign node indices in bottom-to-top, left-to-right scan order.
    placements.sort_by_key(|(coord, _)| (coord.y, coord.x));

    let mut nodes = Vec::with_capacity(placements.len());
    let mut node_at = HashMap::new();
    let mut by_world = HashMap::new();
    for (coord, symbol) in placements {
        let Some(kind) = legend.node_kind(symbol) else {
            continue;
        };
        let Some(world) = coord.to_world() else {
            continue;
        };
        let index = nodes.len();
        nodes.push(MapNode::new(index, coord, world, kind.clone()));
        node_at.insert(coord, index);
        by_world.insert(world, index);
    }

    let height = (last_row + 1).saturating_sub(first_row);

    Ok(ParsedGrid {
        nodes,
        links,
        node_at,
        by_world,
        width,
        height,
    })
}

/// First line containing the marker, with the column of its leftmost
/// occurrence.
fn find_top_marker(lines: &[&str]) -> Option<(usize, usize)> {
    for (idx, line) in lines.iter().enumerate() {
        if let Some(col) = line.chars().position(|c| c == CORNER_MARKER) {
            return Some((idx, col));
        }
    }
    None
}

/// Last line below the top marker carrying the marker in the same column.
fn find_bottom_marker(lines: &[&str], top_line: usize, col: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(top_line + 1)
        .filter(|(_, line)| line.chars().nth(col) == Some(CORNER_MARKER))
        .map(|(idx, _)| idx)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
+ 0 1

1 #-#
  | |
0 #-#
+ 0 1";

    #[test]
    fn test_parse_square_map() {
        let grid = parse_grid("square", SQUARE, &Legend::standard()).unwrap();

        assert_eq!(grid.nodes.len(), 4);
        assert_eq!(grid.links.len(), 4);
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 3);
    }

    #[test]
    fn test_node_indices_scan_bottom_to_top() {
        let grid = parse_grid("square", SQUARE, &Legend::standard()).unwrap();

        assert_eq!(grid.node_at.get(&GridCoord::new(0, 0)), Some(&0));
        assert_eq!(grid.node_at.get(&GridCoord::new(2, 0)), Some(&1));
        assert_eq!(grid.node_at.get(&GridCoord::new(0, 2)), Some(&2));
        assert_eq!(grid.node_at.get(&GridCoord::new(2, 2)), Some(&3));
        assert_eq!(grid.by_world.get(&WorldCoord::new(1, 1)), Some(&3));
    }

    #[test]
    fn test_axis_labels_are_ignored() {
        // The digits in the label columns never reach the legend.
        let grid = parse_grid("square", SQUARE, &Legend::standard()).unwrap();
        assert_eq!(grid.cell_count(), 8);
    }

    #[test]
    fn test_missing_top_marker() {
        let err = parse_grid("bad", "# #\n", &Legend::standard());
        assert!(matches!(err, Err(GridwayError::Parse { .. })));
    }

    #[test]
    fn test_missing_bottom_marker() {
        let text = "+ 0\n\n0 #\n";
        let err = parse_grid("bad", text, &Legend::standard());
        assert!(matches!(err, Err(GridwayError::Parse { .. })));
    }

    #[test]
    fn test_node_on_odd_coordinate_is_fatal() {
        let text = "\
+ 0

0 ##
+ 0";
        let err = parse_grid("bad", text, &Legend::standard());
        assert!(matches!(err, Err(GridwayError::Parse { .. })));
    }

    #[test]
    fn test_unknown_symbol_is_fatal() {
        let text = "\
+ 0

0 #?
+ 0";
        let err = parse_grid("bad", text, &Legend::standard());
        let message = format!("{}", err.unwrap_err());
        assert!(message.contains('?'));
        assert!(message.contains("(1,0)"));
    }

    #[test]
    fn test_neighborhood_reports_cell_kinds() {
        let grid = parse_grid("square", SQUARE, &Legend::standard()).unwrap();
        let nb = grid.neighborhood(GridCoord::new(1, 0));

        assert_eq!(nb.get(Compass::West), CellKind::Node);
        assert_eq!(nb.get(Compass::East), CellKind::Node);
        assert_eq!(nb.get(Compass::Northwest), CellKind::Link);
        assert_eq!(nb.get(Compass::North), CellKind::Empty);
    }

    #[test]
    fn test_empty_region_parses_to_empty_grid() {
        let grid = parse_grid("empty", "+ 0\n\n+ 0", &Legend::standard()).unwrap();
        assert_eq!(grid.nodes.len(), 0);
        assert_eq!(grid.height, 0);
    }
}
