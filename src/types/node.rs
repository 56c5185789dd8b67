//! Node behaviors and placed map nodes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::types::coord::{Compass, GridCoord, WorldCoord};
use crate::types::link::IMPASSABLE;

/// A single-character node behavior, registered in the legend.
pub trait NodeKind: fmt::Debug + Send + Sync {
    /// The legend symbol.
    fn symbol(&self) -> char;

    /// Character shown on rendered maps.
    fn display_symbol(&self) -> char {
        self.symbol()
    }

    /// Path reconstruction halts at this node.
    fn interrupt_path(&self) -> bool {
        false
    }

    /// Whether this node may fan out into more than one exit.
    fn multilink(&self) -> bool {
        true
    }
}

/// Standard room node (`#`).
#[derive(Debug)]
pub struct BasicNode {
    symbol: char,
}

impl BasicNode {
    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }
}

impl NodeKind for BasicNode {
    fn symbol(&self) -> char {
        self.symbol
    }
}

/// Point-of-interest node that halts path reconstruction (`I`).
#[derive(Debug)]
pub struct InterruptNode {
    symbol: char,
}

impl InterruptNode {
    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }
}

impl NodeKind for InterruptNode {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn interrupt_path(&self) -> bool {
        true
    }
}

/// Where a resolved exit leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitTarget {
    /// Node index on the same map.
    Local(usize),
    /// Node on another map, reached through a transition link.
    Remote { map: String, coord: WorldCoord },
}

/// A fully resolved first-hop connection out of a node.
#[derive(Debug, Clone)]
pub struct ResolvedExit {
    /// Externally visible direction name ("n", "sw", "u", ...).
    pub name: String,
    /// Spatial direction of the first step.
    pub start: Compass,
    pub target: ExitTarget,
    /// Chain weight (mean or sum of the per-step weights).
    pub weight: f32,
    /// Link cells traversed, in order. For remote exits, only the cells on
    /// this map.
    pub steps: Vec<GridCoord>,
}

impl ResolvedExit {
    /// Whether the pathfinder may use this exit.
    pub fn is_passable(&self) -> bool {
        self.weight < IMPASSABLE
    }
}

/// A node placed on a parsed map.
///
/// The dense `index` doubles as the row/column into the pathfinding
/// matrices. Exits and routes are populated once by link resolution and
/// immutable afterwards.
#[derive(Debug)]
pub struct MapNode {
    index: usize,
    grid: GridCoord,
    world: WorldCoord,
    kind: Arc<dyn NodeKind>,
    /// First-hop exits keyed by external direction name.
    exits: BTreeMap<String, ResolvedExit>,
    /// Minimal-weight exit name per reachable local node index.
    routes: HashMap<usize, String>,
}

impl MapNode {
    pub(crate) fn new(
        index: usize,
        grid: GridCoord,
        world: WorldCoord,
        kind: Arc<dyn NodeKind>,
    ) -> Self {
        Self {
            index,
            grid,
            world,
            kind,
            exits: BTreeMap::new(),
            routes: HashMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn grid(&self) -> GridCoord {
        self.grid
    }

    pub fn world(&self) -> WorldCoord {
        self.world
    }

    pub fn symbol(&self) -> char {
        self.kind.symbol()
    }

    pub fn display_symbol(&self) -> char {
        self.kind.display_symbol()
    }

    pub fn interrupt_path(&self) -> bool {
        self.kind.interrupt_path()
    }

    pub fn multilink(&self) -> bool {
        self.kind.multilink()
    }

    /// Resolved exits in direction-name order.
    pub fn exits(&self) -> impl Iterator<Item = &ResolvedExit> {
        self.exits.values()
    }

    pub fn exit(&self, name: &str) -> Option<&ResolvedExit> {
        self.exits.get(name)
    }

    /// The minimal-weight first-hop route to a local node, if directly
    /// connected.
    pub fn route_to(&self, target: usize) -> Option<&ResolvedExit> {
        self.routes.get(&target).and_then(|name| self.exits.get(name))
    }

    /// Local node indices directly reachable by a passable first hop.
    pub fn route_targets(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.keys().copied()
    }

    pub(crate) fn set_resolution(
        &mut self,
        exits: BTreeMap<String, ResolvedExit>,
        routes: HashMap<usize, String>,
    ) {
        self.exits = exits;
        self.routes = routes;
    }

    pub(crate) fn insert_exit(&mut self, exit: ResolvedExit) -> bool {
        if self.exits.contains_key(&exit.name) {
            return false;
        }
        self.exits.insert(exit.name.clone(), exit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_node_defaults() {
        let kind = BasicNode::new('#');
        assert_eq!(kind.symbol(), '#');
        assert_eq!(kind.display_symbol(), '#');
        assert!(!kind.interrupt_path());
        assert!(kind.multilink());
    }

    #[test]
    fn test_interrupt_node() {
        let kind = InterruptNode::new('I');
        assert!(kind.interrupt_path());
    }

    #[test]
    fn test_exit_passability() {
        let exit = ResolvedExit {
            name: "e".to_string(),
            start: Compass::East,
            target: ExitTarget::Local(1),
            weight: 1.0,
            steps: vec![],
        };
        assert!(exit.is_passable());

        let blocked = ResolvedExit {
            weight: IMPASSABLE,
            ..exit
        };
        assert!(!blocked.is_passable());
    }

    #[test]
    fn test_node_route_lookup() {
        let mut node = MapNode::new(
            0,
            GridCoord::new(0, 0),
            WorldCoord::new(0, 0),
            Arc::new(BasicNode::new('#')),
        );
        let mut exits = BTreeMap::new();
        exits.insert(
            "e".to_string(),
            ResolvedExit {
                name: "e".to_string(),
                start: Compass::East,
                target: ExitTarget::Local(1),
                weight: 1.0,
                steps: vec![GridCoord::new(1, 0)],
            },
        );
        let mut routes = HashMap::new();
        routes.insert(1, "e".to_string());
        node.set_resolution(exits, routes);

        assert_eq!(node.route_to(1).map(|e| e.name.as_str()), Some("e"));
        assert!(node.route_to(2).is_none());
        assert_eq!(node.exits().count(), 1);
    }
}
