//! Link behaviors and placed map links.
//!
//! A link occupies one grid cell and chains with adjacent links to connect
//! nodes. Behavior lives in [`LinkKind`] implementations registered in the
//! legend; the parser places a [`MapLink`] per cell, and resolution memoizes
//! the final direction map (and teleporter partner) on the placed instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GridwayError, Result};
use crate::types::coord::{Compass, GridCoord};

/// Reserved weight marking a structurally present but impassable step.
pub const IMPASSABLE: f32 = 1.0e9;

/// Entry travel direction -> exit travel direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionMap {
    map: HashMap<Compass, Compass>,
}

impl DirectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(Compass, Compass)]) -> Self {
        Self {
            map: pairs.iter().copied().collect(),
        }
    }

    /// Two-way mapping along an axis: travel continues unchanged in either
    /// direction.
    pub fn straight(axis: Compass) -> Self {
        Self::from_pairs(&[(axis, axis), (axis.opposite(), axis.opposite())])
    }

    /// Pair two connection directions (a knee): entering from the cell at
    /// `a` exits toward `b`, and vice versa.
    pub fn pair(a: Compass, b: Compass) -> Self {
        Self::from_pairs(&[(a.opposite(), b), (b.opposite(), a)])
    }

    pub fn get(&self, enter: Compass) -> Option<Compass> {
        self.map.get(&enter).copied()
    }

    pub fn insert(&mut self, enter: Compass, exit: Compass) {
        self.map.insert(enter, exit);
    }

    pub fn merge(&mut self, other: DirectionMap) {
        self.map.extend(other.map);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The neighbor sides this map connects: the side an entry comes from
    /// is the opposite of its travel direction, the side an exit leaves by
    /// is the travel direction itself.
    fn connected_sides(&self) -> Vec<Compass> {
        let mut sides: Vec<Compass> = Vec::new();
        for (enter, exit) in &self.map {
            for side in [enter.opposite(), *exit] {
                if !sides.contains(&side) {
                    sides.push(side);
                }
            }
        }
        sides
    }
}

/// What occupies a cell, as seen by auto-routing resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Node,
    Link,
}

/// Occupancy of the eight cells around a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighborhood {
    cells: [CellKind; 8],
}

impl Neighborhood {
    fn slot(dir: Compass) -> usize {
        Compass::ALL.iter().position(|d| *d == dir).unwrap_or(0)
    }

    pub fn set(&mut self, dir: Compass, kind: CellKind) {
        self.cells[Self::slot(dir)] = kind;
    }

    pub fn get(&self, dir: Compass) -> CellKind {
        self.cells[Self::slot(dir)]
    }

    pub fn occupied(&self, dir: Compass) -> bool {
        self.get(dir) != CellKind::Empty
    }

    /// Occupied directions in scan order.
    pub fn occupied_dirs(&self) -> Vec<Compass> {
        Compass::ALL
            .into_iter()
            .filter(|d| self.occupied(*d))
            .collect()
    }

    /// Directions holding a node, in scan order.
    pub fn node_dirs(&self) -> Vec<Compass> {
        Compass::ALL
            .into_iter()
            .filter(|d| self.get(*d) == CellKind::Node)
            .collect()
    }
}

/// Behavior when a chain's next step lands on an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyTarget {
    /// Nothing to jump to; the chain dangles (fatal).
    Dangle,
    /// Jump to the one other link carrying the same symbol on this grid.
    Pair,
    /// Jump to the same-symbol link on the named map.
    Transition(String),
}

/// How an auto-routing link derives its direction map from its neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartPolicy {
    /// Pass-throughs plus at most one rerouted pair; never terminates at a
    /// lone neighbor.
    Reroute,
    /// Two node neighbors pair directly; a single leftover neighbor pairs
    /// with its own opposite (the straight-axis case teleporters rely on).
    NodePreferring,
}

/// A single-character link behavior, registered in the legend.
///
/// Implementations either carry a fixed [`directions`](LinkKind::directions)
/// table or set [`is_dynamic`](LinkKind::is_dynamic) and derive the table
/// from the neighborhood in
/// [`resolve_directions`](LinkKind::resolve_directions).
pub trait LinkKind: fmt::Debug + Send + Sync {
    /// The legend symbol.
    fn symbol(&self) -> char;

    /// Fixed direction table. Dynamic kinds leave this empty.
    fn directions(&self) -> DirectionMap {
        DirectionMap::new()
    }

    /// Whether the direction map must be derived from the neighborhood.
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Derive the direction map from the surrounding cells (dynamic kinds).
    fn resolve_directions(&self, at: GridCoord, neighbors: &Neighborhood) -> Result<DirectionMap> {
        let _ = (at, neighbors);
        Ok(self.directions())
    }

    /// Base traversal cost of one step over this link.
    fn default_weight(&self) -> f32 {
        1.0
    }

    /// Cost of entering while traveling `enter`.
    fn weight(&self, enter: Compass) -> f32 {
        let _ = enter;
        self.default_weight()
    }

    /// Path reconstruction halts at this link.
    fn interrupt_path(&self) -> bool {
        false
    }

    /// Chains of averaging links cost their mean step weight; returning
    /// false makes any chain containing this link sum instead.
    fn average_chain_weights(&self) -> bool {
        true
    }

    /// External direction name override for traversal starting in `travel`
    /// (up/down links rename every spatial direction).
    fn direction_alias(&self, travel: Compass) -> Option<&'static str> {
        let _ = travel;
        None
    }

    /// Behavior when the chain's next step lands on an empty cell.
    fn empty_target(&self) -> EmptyTarget {
        EmptyTarget::Dangle
    }

    /// Character shown on rendered maps, given the resolved directions.
    fn display_symbol(&self, resolved: &DirectionMap) -> char {
        let _ = resolved;
        self.symbol()
    }
}

/// Shared auto-routing resolution, parameterized by policy.
pub fn smart_resolve(
    policy: SmartPolicy,
    symbol: char,
    at: GridCoord,
    neighbors: &Neighborhood,
) -> Result<DirectionMap> {
    let occupied = neighbors.occupied_dirs();
    if occupied.is_empty() {
        return Err(GridwayError::Topology {
            message: format!("link '{}' at {} is not connected to anything", symbol, at),
            help: Some("every link must join into a chain that ends at nodes".to_string()),
        });
    }

    if policy == SmartPolicy::NodePreferring {
        let nodes = neighbors.node_dirs();
        if nodes.len() == 2 {
            return Ok(DirectionMap::pair(nodes[0], nodes[1]));
        }
    }

    // Any direction whose exact opposite is also occupied is a straight
    // pass-through; whatever is left must form one clean connection.
    let mut map = DirectionMap::new();
    let mut remaining: Vec<Compass> = Vec::new();
    for dir in occupied {
        if neighbors.occupied(dir.opposite()) {
            map.merge(DirectionMap::straight(dir));
        } else {
            remaining.push(dir);
        }
    }

    match remaining.len() {
        0 => Ok(map),
        1 if policy == SmartPolicy::NodePreferring => {
            map.merge(DirectionMap::straight(remaining[0]));
            Ok(map)
        }
        2 => {
            map.merge(DirectionMap::pair(remaining[0], remaining[1]));
            Ok(map)
        }
        n => Err(GridwayError::Topology {
            message: format!(
                "link '{}' at {} has an ambiguous neighborhood: {} unresolved connections",
                symbol, at, n
            ),
            help: Some(
                "auto-routing links need their non-pass-through neighbors to pair up cleanly"
                    .to_string(),
            ),
        }),
    }
}

/// The plain link glyph matching a resolved direction map, if any.
///
/// Used by kinds that want to blend into the map display (blocked links).
fn plain_link_symbol(resolved: &DirectionMap) -> Option<char> {
    let mut dirs = resolved.connected_sides();
    dirs.sort_by_key(|d| Neighborhood::slot(*d));
    match dirs.as_slice() {
        [Compass::North, Compass::South] => Some('|'),
        [Compass::East, Compass::West] => Some('-'),
        [Compass::Northeast, Compass::Southwest] => Some('/'),
        [Compass::Southeast, Compass::Northwest] => Some('\\'),
        [Compass::North, Compass::East, Compass::South, Compass::West] => Some('+'),
        [Compass::Northeast, Compass::Southeast, Compass::Southwest, Compass::Northwest] => {
            Some('x')
        }
        _ => None,
    }
}

/// Fixed-table link: straights, crossings and one-ways.
#[derive(Debug)]
pub struct StaticLink {
    symbol: char,
    directions: DirectionMap,
    weight: f32,
}

impl StaticLink {
    /// Two-way link along an axis (`-`, `|`, `/`, `\`).
    pub fn two_way(symbol: char, axis: Compass) -> Self {
        Self {
            symbol,
            directions: DirectionMap::straight(axis),
            weight: 1.0,
        }
    }

    /// One-way link traversable only while traveling `travel`.
    pub fn one_way(symbol: char, travel: Compass) -> Self {
        Self {
            symbol,
            directions: DirectionMap::from_pairs(&[(travel, travel)]),
            weight: 1.0,
        }
    }

    /// Crossing of independent straight axes sharing one cell (`+`, `x`).
    pub fn crossing(symbol: char, axes: &[Compass]) -> Self {
        let mut directions = DirectionMap::new();
        for axis in axes {
            directions.merge(DirectionMap::straight(*axis));
        }
        Self {
            symbol,
            directions,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

impl LinkKind for StaticLink {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn directions(&self) -> DirectionMap {
        self.directions.clone()
    }

    fn default_weight(&self) -> f32 {
        self.weight
    }
}

/// Auto-routing link core shared by the router, up/down, blocked and
/// interrupt kinds.
#[derive(Debug)]
pub struct SmartLink {
    symbol: char,
    policy: SmartPolicy,
    alias: Option<&'static str>,
    weight: f32,
    interrupt: bool,
    plain_display: bool,
}

impl SmartLink {
    /// Rerouting knee/crossing (`o`).
    pub fn router(symbol: char) -> Self {
        Self {
            symbol,
            policy: SmartPolicy::Reroute,
            alias: None,
            weight: 1.0,
            interrupt: false,
            plain_display: false,
        }
    }

    /// Up/down shaft: all travel over it is named `alias`.
    pub fn vertical(symbol: char, alias: &'static str) -> Self {
        Self {
            symbol,
            policy: SmartPolicy::NodePreferring,
            alias: Some(alias),
            weight: 1.0,
            interrupt: false,
            plain_display: false,
        }
    }

    /// Impassable link that keeps visual continuity (`b`).
    pub fn blocked(symbol: char) -> Self {
        Self {
            symbol,
            policy: SmartPolicy::NodePreferring,
            alias: None,
            weight: IMPASSABLE,
            interrupt: false,
            plain_display: true,
        }
    }

    /// Passable link that halts path reconstruction (`i`).
    pub fn interrupt(symbol: char) -> Self {
        Self {
            symbol,
            policy: SmartPolicy::NodePreferring,
            alias: None,
            weight: 1.0,
            interrupt: true,
            plain_display: false,
        }
    }
}

impl LinkKind for SmartLink {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn resolve_directions(&self, at: GridCoord, neighbors: &Neighborhood) -> Result<DirectionMap> {
        smart_resolve(self.policy, self.symbol, at, neighbors)
    }

    fn default_weight(&self) -> f32 {
        self.weight
    }

    fn interrupt_path(&self) -> bool {
        self.interrupt
    }

    fn direction_alias(&self, _travel: Compass) -> Option<&'static str> {
        self.alias
    }

    fn display_symbol(&self, resolved: &DirectionMap) -> char {
        if self.plain_display {
            plain_link_symbol(resolved).unwrap_or(self.symbol)
        } else {
            self.symbol
        }
    }
}

/// Same-grid teleporter: when its chain would step off the grid it jumps to
/// the one other link carrying the same symbol.
#[derive(Debug)]
pub struct TeleporterLink {
    symbol: char,
}

impl TeleporterLink {
    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }
}

impl LinkKind for TeleporterLink {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn resolve_directions(&self, at: GridCoord, neighbors: &Neighborhood) -> Result<DirectionMap> {
        smart_resolve(SmartPolicy::NodePreferring, self.symbol, at, neighbors)
    }

    fn empty_target(&self) -> EmptyTarget {
        EmptyTarget::Pair
    }
}

/// Cross-map transition: like a teleporter, but the partner lives on the
/// named map. Always interrupts, so pathfinding stops at the boundary.
#[derive(Debug)]
pub struct TransitionLink {
    symbol: char,
    target_map: String,
}

impl TransitionLink {
    pub fn new(symbol: char, target_map: impl Into<String>) -> Self {
        Self {
            symbol,
            target_map: target_map.into(),
        }
    }

    pub fn target_map(&self) -> &str {
        &self.target_map
    }
}

impl LinkKind for TransitionLink {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn resolve_directions(&self, at: GridCoord, neighbors: &Neighborhood) -> Result<DirectionMap> {
        smart_resolve(SmartPolicy::NodePreferring, self.symbol, at, neighbors)
    }

    fn interrupt_path(&self) -> bool {
        true
    }

    fn empty_target(&self) -> EmptyTarget {
        EmptyTarget::Transition(self.target_map.clone())
    }
}

/// A link placed on a parsed map.
///
/// Carries the memoized direction map (static table, or the auto-routing
/// result) and, for teleporters, the resolved partner cell. Immutable once
/// the map is published.
#[derive(Debug, Clone)]
pub struct MapLink {
    coord: GridCoord,
    symbol: char,
    kind: Arc<dyn LinkKind>,
    directions: DirectionMap,
    partner: Option<GridCoord>,
}

impl MapLink {
    pub(crate) fn new(coord: GridCoord, symbol: char, kind: Arc<dyn LinkKind>) -> Self {
        let directions = kind.directions();
        Self {
            coord,
            symbol,
            kind,
            directions,
            partner: None,
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// Exit travel direction for an entry travel direction, if traversable.
    pub fn direction(&self, enter: Compass) -> Option<Compass> {
        self.directions.get(enter)
    }

    pub fn weight(&self, enter: Compass) -> f32 {
        self.kind.weight(enter)
    }

    pub fn interrupt_path(&self) -> bool {
        self.kind.interrupt_path()
    }

    pub fn average_chain_weights(&self) -> bool {
        self.kind.average_chain_weights()
    }

    pub fn direction_alias(&self, travel: Compass) -> Option<&'static str> {
        self.kind.direction_alias(travel)
    }

    pub fn empty_target(&self) -> EmptyTarget {
        self.kind.empty_target()
    }

    pub fn display_symbol(&self) -> char {
        self.kind.display_symbol(&self.directions)
    }

    /// Resolved same-grid pairing partner (teleporters).
    pub fn partner(&self) -> Option<GridCoord> {
        self.partner
    }

    pub(crate) fn is_dynamic(&self) -> bool {
        self.kind.is_dynamic()
    }

    pub(crate) fn resolve_dynamic(&self, neighbors: &Neighborhood) -> Result<DirectionMap> {
        self.kind.resolve_directions(self.coord, neighbors)
    }

    pub(crate) fn set_directions(&mut self, directions: DirectionMap) {
        self.directions = directions;
    }

    pub(crate) fn set_partner(&mut self, partner: GridCoord) {
        self.partner = Some(partner);
    }
}
