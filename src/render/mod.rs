//! Visual-range rendering.
//!
//! Renders a bounded sub-region of a map as characters, by raw grid
//! distance (scan mode) or by node-hop reachability (nodes mode), with an
//! optional shortest-path overlay toward a target and centered output
//! cropping. Returned grids ascend in y (row 0 is the south edge); the
//! string form is reversed into printing order.

use std::collections::{HashMap, HashSet};

use crate::map::WorldMap;
use crate::pathfind::PathElement;
use crate::types::node::ExitTarget;
use crate::types::{GridCoord, WorldCoord};

/// Distance semantics for a visual range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Raw grid steps in every direction: a simple crop of the display
    /// matrix.
    Scan,
    /// Reachable node hops along resolved link chains; long chains can
    /// span a much larger character area.
    Nodes,
}

/// Options for [`WorldMap::get_visual_range`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Range in grid steps (scan) or node hops (nodes).
    pub distance: u32,
    pub mode: RangeMode,
    /// Character marking the center cell.
    pub marker: Option<char>,
    /// Overlay the shortest path toward this coordinate.
    pub target: Option<WorldCoord>,
    /// Styling applied to each path link inside the view; defaults to
    /// replacing the glyph with `*`.
    pub target_style: Option<fn(char) -> char>,
    /// Crop the output to at most (width, height), centered on the center
    /// coordinate.
    pub max_size: Option<(usize, usize)>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            distance: 2,
            mode: RangeMode::Scan,
            marker: Some('@'),
            target: None,
            target_style: None,
            max_size: None,
        }
    }
}

fn default_target_style(_glyph: char) -> char {
    '*'
}

/// A rendered sub-region: rows ascend in y, anchored at `min`.
struct Panel {
    cells: Vec<Vec<char>>,
    min: GridCoord,
}

impl Panel {
    fn blank(min: GridCoord, width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            min,
        }
    }

    fn single(glyph: char) -> Self {
        Self {
            cells: vec![vec![glyph]],
            min: GridCoord::new(0, 0),
        }
    }

    fn width(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    fn height(&self) -> usize {
        self.cells.len()
    }

    fn slot(&self, coord: GridCoord) -> Option<(usize, usize)> {
        let x = coord.x - self.min.x;
        let y = coord.y - self.min.y;
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (y < self.height() && x < self.width()).then_some((x, y))
    }

    fn get(&self, coord: GridCoord) -> Option<char> {
        self.slot(coord).map(|(x, y)| self.cells[y][x])
    }

    fn stamp(&mut self, coord: GridCoord, glyph: char) {
        if let Some((x, y)) = self.slot(coord) {
            self.cells[y][x] = glyph;
        }
    }
}

/// Render the sub-region around `center` described by `options`.
pub fn visual_range(
    map: &WorldMap,
    center: WorldCoord,
    options: &ViewOptions,
) -> Vec<Vec<char>> {
    let Some(center_node) = map.get_node(center) else {
        // Off-grid or empty center degenerates to just the marker.
        return Panel::single(options.marker.unwrap_or(' ')).cells;
    };
    let center_grid = center_node.grid();

    let mut panel = match options.mode {
        RangeMode::Scan => scan_panel(map, center_grid, options.distance),
        RangeMode::Nodes => nodes_panel(map, center_node.index(), options.distance),
    };

    if let Some(target) = options.target {
        let style = options.target_style.unwrap_or(default_target_style);
        overlay_path(map, center, target, options.distance, style, &mut panel);
    }

    if let Some(marker) = options.marker {
        panel.stamp(center_grid, marker);
    }

    if let Some(max_size) = options.max_size {
        crop_centered(&mut panel, center_grid, max_size);
    }

    panel.cells
}

/// Like [`visual_range`], joined into a printable top-down string.
pub fn visual_range_string(map: &WorldMap, center: WorldCoord, options: &ViewOptions) -> String {
    visual_range(map, center, options)
        .iter()
        .rev()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Crop of the display matrix by raw grid distance.
fn scan_panel(map: &WorldMap, center: GridCoord, distance: u32) -> Panel {
    let (width, height) = map.size();
    let d = distance as i32;

    let min_x = (center.x - d).max(0);
    let min_y = (center.y - d).max(0);
    let max_x = (center.x + d).min(width as i32 - 1);
    let max_y = (center.y + d).min(height as i32 - 1);
    if max_x < min_x || max_y < min_y {
        return Panel::single(' ');
    }

    let display = map.display();
    let mut panel = Panel::blank(
        GridCoord::new(min_x, min_y),
        (max_x - min_x + 1) as usize,
        (max_y - min_y + 1) as usize,
    );
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let glyph = display[y as usize][x as usize];
            panel.stamp(GridCoord::new(x, y), glyph);
        }
    }
    panel
}

/// Tight bounding box of everything within `distance` node hops,
/// expanded depth-first along resolved link chains.
fn nodes_panel(map: &WorldMap, start: usize, distance: u32) -> Panel {
    let nodes = map.nodes();
    let mut cells: HashSet<GridCoord> = HashSet::new();
    let mut best_budget: HashMap<usize, u32> = HashMap::new();
    let mut stack = vec![(start, distance)];

    cells.insert(nodes[start].grid());
    best_budget.insert(start, distance);

    while let Some((index, budget)) = stack.pop() {
        if budget == 0 {
            continue;
        }
        for exit in nodes[index].exits() {
            // Chain cells stay visible even when the exit is impassable or
            // leads off-map.
            for &step in &exit.steps {
                cells.insert(step);
            }
            if let ExitTarget::Local(target) = exit.target {
                cells.insert(nodes[target].grid());
                let remaining = budget - 1;
                if best_budget.get(&target).map_or(true, |&b| remaining > b) {
                    best_budget.insert(target, remaining);
                    stack.push((target, remaining));
                }
            }
        }
    }

    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);

    let display = map.display();
    let mut panel = Panel::blank(
        GridCoord::new(min_x, min_y),
        (max_x - min_x + 1) as usize,
        (max_y - min_y + 1) as usize,
    );
    for coord in cells {
        let glyph = display
            .get(coord.y as usize)
            .and_then(|row| row.get(coord.x as usize))
            .copied()
            .unwrap_or(' ');
        panel.stamp(coord, glyph);
    }
    panel
}

/// Decorate the links of the shortest path toward `target`, capped at
/// `distance` node hops. Path cells outside the panel are skipped.
fn overlay_path(
    map: &WorldMap,
    center: WorldCoord,
    target: WorldCoord,
    distance: u32,
    style: fn(char) -> char,
    panel: &mut Panel,
) {
    let (_, elements) = map.get_shortest_path(center, target);
    let mut completed_hops = 0u32;
    let mut seen_first_node = false;

    for element in &elements {
        match element {
            PathElement::Node(_) => {
                if seen_first_node {
                    completed_hops += 1;
                    if completed_hops >= distance {
                        break;
                    }
                } else {
                    seen_first_node = true;
                }
            }
            PathElement::Link(coord) => {
                if let Some(current) = panel.get(*coord) {
                    panel.stamp(*coord, style(current));
                }
            }
        }
    }
}

/// Crop the panel to at most (width, height), centered as closely as
/// possible on `center` and clipped at panel edges.
fn crop_centered(panel: &mut Panel, center: GridCoord, (max_w, max_h): (usize, usize)) {
    let max_w = max_w.max(1);
    let max_h = max_h.max(1);

    if panel.height() > max_h {
        let center_row = (center.y - panel.min.y).max(0) as usize;
        let start = center_row
            .saturating_sub(max_h / 2)
            .min(panel.height() - max_h);
        panel.cells.drain(..start);
        panel.cells.truncate(max_h);
        panel.min.y += start as i32;
    }

    if panel.width() > max_w {
        let center_col = (center.x - panel.min.x).max(0) as usize;
        let start = center_col
            .saturating_sub(max_w / 2)
            .min(panel.width() - max_w);
        for row in &mut panel.cells {
            row.drain(..start);
            row.truncate(max_w);
        }
        panel.min.x += start as i32;
    }
}
