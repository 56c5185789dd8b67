//! Shortest-path computation over resolved node linkages.
//!
//! Builds adjacency lists from each node's minimal-weight routes (absence
//! of an edge is represented by absence, never by a zero weight), runs
//! Dijkstra once per source, and reconstructs paths through the recorded
//! per-node route data, honoring interrupt semantics.

pub mod cache;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::Serialize;

use crate::types::link::MapLink;
use crate::types::node::MapNode;
use crate::types::GridCoord;

pub use cache::PathCache;

/// One element of a reconstructed path: nodes and links alternate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathElement {
    /// Node index on the map.
    Node(usize),
    /// Grid cell of a traversed link.
    Link(GridCoord),
}

/// All-sources shortest-path data: distance and predecessor matrices.
///
/// A pure function of the resolved node linkages (and therefore of the map
/// text); recomputed wholesale whenever the map is re-parsed.
#[derive(Debug, Clone)]
pub struct PathData {
    pub(crate) dist: Vec<Vec<f32>>,
    pub(crate) pred: Vec<Vec<Option<u32>>>,
}

impl PathData {
    /// Run Dijkstra from every node.
    pub fn compute(nodes: &[MapNode]) -> PathData {
        let n = nodes.len();
        let adjacency: Vec<Vec<(usize, f32)>> = nodes
            .iter()
            .map(|node| {
                let mut edges: Vec<(usize, f32)> = node
                    .route_targets()
                    .filter_map(|target| node.route_to(target).map(|e| (target, e.weight)))
                    .collect();
                edges.sort_by_key(|(target, _)| *target);
                edges
            })
            .collect();

        let mut dist = Vec::with_capacity(n);
        let mut pred = Vec::with_capacity(n);
        for source in 0..n {
            let (d, p) = dijkstra(&adjacency, source, n);
            dist.push(d);
            pred.push(p);
        }
        PathData { dist, pred }
    }

    /// Shortest distance between two node indices, if reachable.
    pub fn distance(&self, from: usize, to: usize) -> Option<f32> {
        let d = *self.dist.get(from)?.get(to)?;
        d.is_finite().then_some(d)
    }

    pub fn node_count(&self) -> usize {
        self.dist.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    dist: f32,
    node: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Weights are never NaN, so total_cmp is a plain numeric order.
        self.dist
            .total_cmp(&other.dist)
            .then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(
    adjacency: &[Vec<(usize, f32)>],
    source: usize,
    n: usize,
) -> (Vec<f32>, Vec<Option<u32>>) {
    let mut dist = vec![f32::INFINITY; n];
    let mut pred: Vec<Option<u32>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(Reverse(QueueEntry {
        dist: 0.0,
        node: source,
    }));

    while let Some(Reverse(entry)) = heap.pop() {
        if entry.dist > dist[entry.node] {
            continue;
        }
        for &(target, weight) in &adjacency[entry.node] {
            let candidate = entry.dist + weight;
            if candidate < dist[target] {
                dist[target] = candidate;
                pred[target] = Some(entry.node as u32);
                heap.push(Reverse(QueueEntry {
                    dist: candidate,
                    node: target,
                }));
            }
        }
    }

    (dist, pred)
}

/// Reconstruct the minimal-weight route between two node indices.
///
/// Returns the external direction names and the alternating node/link
/// elements. Honors interrupt semantics: the result begins at the last
/// interrupting node or link passed, never silently continuing through
/// one. Unreachable pairs yield empty lists.
pub fn shortest_path(
    nodes: &[MapNode],
    links: &HashMap<GridCoord, MapLink>,
    data: &PathData,
    start: usize,
    end: usize,
) -> (Vec<String>, Vec<PathElement>) {
    if start >= nodes.len() || end >= nodes.len() {
        return (Vec::new(), Vec::new());
    }
    if start == end {
        return (Vec::new(), vec![PathElement::Node(start)]);
    }
    if !data.dist[start][end].is_finite() {
        return (Vec::new(), Vec::new());
    }

    // Walk the predecessor chain backward from the destination.
    let mut chain = vec![end];
    let mut current = end;
    while current != start {
        let Some(previous) = data.pred[start][current] else {
            return (Vec::new(), Vec::new());
        };
        current = previous as usize;
        chain.push(current);
        if chain.len() > nodes.len() {
            return (Vec::new(), Vec::new());
        }
    }
    chain.reverse();

    // Expand each hop through the node's recorded route data.
    let mut directions: Vec<String> = Vec::new();
    let mut elements: Vec<PathElement> = vec![PathElement::Node(chain[0])];

    for (i, pair) in chain.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let node = &nodes[from];

        // An interrupting intermediate node restarts the recorded path at
        // itself; the journey start never does.
        if i > 0 && node.interrupt_path() {
            directions.clear();
            elements = vec![PathElement::Node(from)];
        }

        let Some(exit) = node.route_to(to) else {
            return (Vec::new(), Vec::new());
        };
        directions.push(exit.name.clone());

        for &step in &exit.steps {
            let interrupting = links.get(&step).map_or(false, |l| l.interrupt_path());
            if interrupting {
                // Restart at the interrupting link, keeping this hop's
                // direction.
                directions = vec![exit.name.clone()];
                elements = vec![PathElement::Link(step)];
            } else {
                elements.push(PathElement::Link(step));
            }
        }
        elements.push(PathElement::Node(to));
    }

    (directions, elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grid::{parse_grid, ParsedGrid};
    use crate::resolve::resolve_grid;
    use crate::types::{Compass, Legend, WorldCoord};

    fn build(text: &str) -> ParsedGrid {
        let mut grid = parse_grid("test", text, &Legend::standard()).unwrap();
        resolve_grid(&mut grid, "test").unwrap();
        grid
    }

    const SQUARE: &str = "\
+ 0 1

1 #-#
  | |
0 #-#
+ 0 1";

    #[test]
    fn test_square_shortest_path() {
        let grid = build(SQUARE);
        let data = PathData::compute(&grid.nodes);

        let start = grid.by_world[&WorldCoord::new(0, 0)];
        let end = grid.by_world[&WorldCoord::new(1, 1)];
        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, start, end);

        assert_eq!(directions.len(), 2);
        assert!(directions == ["e", "n"] || directions == ["n", "e"]);
        // Node/Link/Node/Link/Node.
        assert_eq!(elements.len(), 5);
        assert!(matches!(elements[0], PathElement::Node(i) if i == start));
        assert!(matches!(elements[1], PathElement::Link(_)));
        assert!(matches!(elements[2], PathElement::Node(_)));
        assert!(matches!(elements[3], PathElement::Link(_)));
        assert!(matches!(elements[4], PathElement::Node(i) if i == end));

        assert!((data.distance(start, end).unwrap() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_length_query() {
        let grid = build(SQUARE);
        let data = PathData::compute(&grid.nodes);

        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, 0, 0);
        assert!(directions.is_empty());
        assert_eq!(elements, vec![PathElement::Node(0)]);
    }

    #[test]
    fn test_unreachable_is_empty() {
        let text = "\
+ 0 1 2

0 #-# #
+ 0 1 2";
        let grid = build(text);
        let data = PathData::compute(&grid.nodes);

        let isolated = grid.by_world[&WorldCoord::new(2, 0)];
        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, 0, isolated);
        assert!(directions.is_empty());
        assert!(elements.is_empty());
        assert!(data.distance(0, isolated).is_none());
    }

    #[test]
    fn test_one_way_asymmetric_distance() {
        let grid = build("+ 0 1\n\n0 #>#\n+ 0 1");
        let data = PathData::compute(&grid.nodes);

        assert!(data.distance(0, 1).is_some());
        assert!(data.distance(1, 0).is_none());
    }

    #[test]
    fn test_blocked_link_never_selected() {
        let grid = build("+ 0 1\n\n0 #b#\n+ 0 1");
        let data = PathData::compute(&grid.nodes);

        assert!(data.distance(0, 1).is_none());
    }

    #[test]
    fn test_interrupt_node_truncates_path_start() {
        let text = "\
+ 0 1 2

0 #-I-#
+ 0 1 2";
        let grid = build(text);
        let data = PathData::compute(&grid.nodes);

        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, 0, 2);

        // The returned path begins at the interrupting node.
        assert_eq!(directions, vec!["e".to_string()]);
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[0], PathElement::Node(1)));
        assert!(matches!(elements[2], PathElement::Node(2)));
    }

    #[test]
    fn test_interrupt_link_truncates_path_start() {
        let text = "\
+ 0 1 2

0 #-i-#
+ 0 1 2";
        let grid = build(text);
        let data = PathData::compute(&grid.nodes);

        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, 0, 1);

        assert_eq!(directions, vec!["e".to_string()]);
        // Restarts at the interrupting link: i, -, end node.
        assert_eq!(
            elements,
            vec![
                PathElement::Link(GridCoord::new(2, 0)),
                PathElement::Link(GridCoord::new(3, 0)),
                PathElement::Node(1),
            ]
        );
    }

    #[test]
    fn test_interrupt_at_destination_does_not_truncate() {
        let text = "\
+ 0 1

0 #-I
+ 0 1";
        let grid = build(text);
        let data = PathData::compute(&grid.nodes);

        let (directions, elements) = shortest_path(&grid.nodes, &grid.links, &data, 0, 1);
        assert_eq!(directions, vec!["e".to_string()]);
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[0], PathElement::Node(0)));
    }

    #[test]
    fn test_weighted_route_prefers_cheap_detour() {
        use crate::types::StaticLink;
        use std::sync::Arc;

        // The direct east link costs 5; going around the square costs 3.
        let legend = Legend::standard()
            .with_link(Arc::new(StaticLink::two_way('=', Compass::East).with_weight(5.0)));
        let text = "\
+ 0 1

1 #-#
  | |
0 #=#
+ 0 1";
        let mut grid = parse_grid("test", text, &legend).unwrap();
        resolve_grid(&mut grid, "test").unwrap();
        let data = PathData::compute(&grid.nodes);

        let a = grid.by_world[&WorldCoord::new(0, 0)];
        let b = grid.by_world[&WorldCoord::new(1, 0)];
        assert!((data.distance(a, b).unwrap() - 3.0).abs() < f32::EPSILON);

        let (directions, _) = shortest_path(&grid.nodes, &grid.links, &data, a, b);
        assert_eq!(directions, vec!["n".to_string(), "e".to_string(), "s".to_string()]);
    }
}
