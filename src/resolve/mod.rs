//! Link resolution: smart directions, teleporter pairing, and chain walks.
//!
//! Runs once per parse, before a map is published:
//! 1. derive direction maps for auto-routing links from their neighborhoods,
//! 2. pair teleporters through a one-time symbol index,
//! 3. walk chains out of every node in all eight directions, recording the
//!    destination, accumulated weight and traversed steps.
//!
//! Chains ending in a cross-map transition are returned as pending; the
//! map registry completes them once all maps exist.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{GridwayError, Result};
use crate::parser::grid::ParsedGrid;
use crate::types::link::{EmptyTarget, MapLink, IMPASSABLE};
use crate::types::node::{ExitTarget, ResolvedExit};
use crate::types::{Compass, GridCoord};

/// Read-only view of placed cells, shared by parse-time resolution and the
/// registry's cross-map continuation walks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GridRef<'a> {
    node_at: &'a HashMap<GridCoord, usize>,
    links: &'a HashMap<GridCoord, MapLink>,
}

impl<'a> GridRef<'a> {
    pub(crate) fn new(
        node_at: &'a HashMap<GridCoord, usize>,
        links: &'a HashMap<GridCoord, MapLink>,
    ) -> Self {
        Self { node_at, links }
    }

    fn cell_count(&self) -> usize {
        self.node_at.len() + self.links.len()
    }

    fn node(&self, coord: GridCoord) -> Option<usize> {
        self.node_at.get(&coord).copied()
    }

    fn link(&self, coord: GridCoord) -> Option<&'a MapLink> {
        self.links.get(&coord)
    }
}

/// Where a completed chain walk ended up.
#[derive(Debug)]
pub(crate) enum ChainEnd {
    /// A node on this map.
    Local(usize),
    /// A transition link fired; the destination lives on another map.
    Remote {
        target_map: String,
        via: GridCoord,
        symbol: char,
        travel: Compass,
    },
}

/// A completed chain walk.
#[derive(Debug)]
pub(crate) struct ChainOutcome {
    pub end: ChainEnd,
    /// Link cells traversed, in order.
    pub steps: Vec<GridCoord>,
    /// Per-step weights, keyed by entry direction at each step.
    pub weights: Vec<f32>,
    /// False once any traversed link opts out of weight averaging.
    pub average: bool,
    /// Direction-name override from the first link in the chain.
    pub alias: Option<&'static str>,
}

/// A chain that crossed a transition link and awaits registry linking.
#[derive(Debug, Clone)]
pub struct PendingTransition {
    pub(crate) node: usize,
    pub(crate) name: String,
    pub(crate) start: Compass,
    pub(crate) steps: Vec<GridCoord>,
    pub(crate) weights: Vec<f32>,
    pub(crate) average: bool,
    pub(crate) via: GridCoord,
    pub(crate) symbol: char,
    pub(crate) target_map: String,
    pub(crate) travel: Compass,
}

impl PendingTransition {
    /// The map the transition leads to.
    pub fn target_map(&self) -> &str {
        &self.target_map
    }
}

/// How a chain walk begins.
enum FirstStep {
    /// Step out of a node cell in the travel direction.
    FromNode(GridCoord),
    /// Enter a specific link cell directly (teleport/transition landing).
    IntoLink(GridCoord),
}

/// Resolve a parsed grid in place. Returns chains pending cross-map
/// completion.
pub fn resolve_grid(grid: &mut ParsedGrid, map_name: &str) -> Result<Vec<PendingTransition>> {
    resolve_smart_directions(grid)?;
    pair_teleporters(grid, map_name)?;
    resolve_node_exits(grid, map_name)
}

/// Derive and memoize direction maps for auto-routing links.
///
/// Smart resolution only inspects neighbor presence, never neighbor
/// direction maps, so order does not matter.
fn resolve_smart_directions(grid: &mut ParsedGrid) -> Result<()> {
    let dynamic: Vec<GridCoord> = grid
        .links
        .values()
        .filter(|link| link.is_dynamic())
        .map(|link| link.coord())
        .collect();

    let mut resolved = Vec::with_capacity(dynamic.len());
    for coord in dynamic {
        let neighborhood = grid.neighborhood(coord);
        if let Some(link) = grid.links.get(&coord) {
            resolved.push((coord, link.resolve_dynamic(&neighborhood)?));
        }
    }

    for (coord, directions) in resolved {
        if let Some(link) = grid.links.get_mut(&coord) {
            link.set_directions(directions);
        }
    }
    Ok(())
}

/// Pair teleporters through a one-time symbol index.
fn pair_teleporters(grid: &mut ParsedGrid, map_name: &str) -> Result<()> {
    let mut index: HashMap<char, Vec<GridCoord>> = HashMap::new();
    for link in grid.links.values() {
        if link.empty_target() == EmptyTarget::Pair {
            index.entry(link.symbol()).or_default().push(link.coord());
        }
    }

    let mut pairs = Vec::new();
    for (symbol, coords) in &index {
        for &coord in coords {
            let others: Vec<GridCoord> =
                coords.iter().copied().filter(|&c| c != coord).collect();
            if others.len() != 1 {
                return Err(GridwayError::Topology {
                    message: format!(
                        "Map '{}': teleporter '{}' at {} needs exactly one partner, found {}",
                        map_name,
                        symbol,
                        coord,
                        others.len()
                    ),
                    help: Some(
                        "place exactly two links with this symbol on the map".to_string(),
                    ),
                });
            }
            pairs.push((coord, others[0]));
        }
    }

    for (coord, partner) in pairs {
        if let Some(link) = grid.links.get_mut(&coord) {
            link.set_partner(partner);
        }
    }
    Ok(())
}

/// Walk chains out of every node and record the resolved exits and
/// minimal-weight routes.
fn resolve_node_exits(
    grid: &mut ParsedGrid,
    map_name: &str,
) -> Result<Vec<PendingTransition>> {
    let gref = GridRef::new(&grid.node_at, &grid.links);
    let mut results = Vec::with_capacity(grid.nodes.len());
    let mut pendings = Vec::new();

    for node in &grid.nodes {
        let mut exits: BTreeMap<String, ResolvedExit> = BTreeMap::new();
        let mut routes: HashMap<usize, String> = HashMap::new();
        let mut best: HashMap<usize, f32> = HashMap::new();
        let mut names_seen: HashSet<String> = HashSet::new();
        let mut exit_count = 0usize;

        for dir in Compass::ALL {
            let Some(outcome) = walk_from_node(&gref, node.grid(), dir, map_name)? else {
                continue;
            };

            let name = outcome
                .alias
                .map(str::to_string)
                .unwrap_or_else(|| dir.short_name().to_string());
            if !names_seen.insert(name.clone()) {
                return Err(GridwayError::Topology {
                    message: format!(
                        "Map '{}': node at {} has two exits that both resolve to direction '{}'",
                        map_name,
                        node.world(),
                        name
                    ),
                    help: Some(
                        "links adjacent to the same node must expose distinct direction names"
                            .to_string(),
                    ),
                });
            }
            exit_count += 1;

            let weight = chain_weight(&outcome.weights, outcome.average);
            match outcome.end {
                ChainEnd::Local(target) => {
                    // Keep the minimal-weight route per destination; ties go
                    // to the earlier scan direction.
                    if weight < IMPASSABLE && best.get(&target).map_or(true, |&w| weight < w) {
                        best.insert(target, weight);
                        routes.insert(target, name.clone());
                    }
                    exits.insert(
                        name.clone(),
                        ResolvedExit {
                            name,
                            start: dir,
                            target: ExitTarget::Local(target),
                            weight,
                            steps: outcome.steps,
                        },
                    );
                }
                ChainEnd::Remote {
                    target_map,
                    via,
                    symbol,
                    travel,
                } => {
                    pendings.push(PendingTransition {
                        node: node.index(),
                        name,
                        start: dir,
                        steps: outcome.steps,
                        weights: outcome.weights,
                        average: outcome.average,
                        via,
                        symbol,
                        target_map,
                        travel,
                    });
                }
            }
        }

        if !node.multilink() && exit_count > 1 {
            return Err(GridwayError::Topology {
                message: format!(
                    "Map '{}': node at {} fans out into {} exits but its kind allows only one",
                    map_name,
                    node.world(),
                    exit_count
                ),
                help: None,
            });
        }

        results.push((exits, routes));
    }

    for (node, (exits, routes)) in grid.nodes.iter_mut().zip(results) {
        node.set_resolution(exits, routes);
    }
    Ok(pendings)
}

/// Total chain weight: the mean of step weights, or their sum once any
/// link opted out of averaging. A chain containing an impassable step is
/// impassable outright.
pub(crate) fn chain_weight(weights: &[f32], average: bool) -> f32 {
    if weights.is_empty() {
        return 0.0;
    }
    if weights.iter().any(|w| *w >= IMPASSABLE) {
        return IMPASSABLE;
    }
    let total: f32 = weights.iter().sum();
    if average {
        total / weights.len() as f32
    } else {
        total
    }
}

/// Walk a chain starting by stepping out of a node.
///
/// `Ok(None)` means no connection that way: the first cell is empty, or
/// holds a link that cannot be entered in that travel direction (how
/// one-way links refuse reverse traversal).
pub(crate) fn walk_from_node(
    grid: &GridRef<'_>,
    origin: GridCoord,
    start: Compass,
    map_name: &str,
) -> Result<Option<ChainOutcome>> {
    walk(grid, map_name, FirstStep::FromNode(origin), start)
}

/// Walk a chain starting inside a link cell (a transition landing on its
/// partner map). The link must be enterable in the travel direction.
pub(crate) fn walk_into_link(
    grid: &GridRef<'_>,
    link_coord: GridCoord,
    travel: Compass,
    map_name: &str,
) -> Result<ChainOutcome> {
    walk(grid, map_name, FirstStep::IntoLink(link_coord), travel)?.ok_or_else(|| {
        GridwayError::Topology {
            message: format!(
                "Map '{}': chain continuation at {} found nothing to traverse",
                map_name, link_coord
            ),
            help: None,
        }
    })
}

fn walk(
    grid: &GridRef<'_>,
    map_name: &str,
    first: FirstStep,
    start: Compass,
) -> Result<Option<ChainOutcome>> {
    let (mut pos, mut jump, lenient_first) = match first {
        FirstStep::FromNode(coord) => (coord, None, true),
        FirstStep::IntoLink(coord) => (coord, Some(coord), false),
    };
    let origin = pos;
    let mut travel = start;
    let mut steps: Vec<GridCoord> = Vec::new();
    let mut weights: Vec<f32> = Vec::new();
    let mut average = true;
    let mut alias: Option<&'static str> = None;

    // Bounded by the number of placed cells so link cycles terminate.
    let limit = grid.cell_count() + 1;

    loop {
        if steps.len() > limit {
            return Err(GridwayError::Topology {
                message: format!(
                    "Map '{}': link chain from {} heading {} never reaches a node",
                    map_name, origin, start
                ),
                help: Some("the chain loops through links without terminating".to_string()),
            });
        }

        let next = match jump.take() {
            Some(coord) => coord,
            None => pos.step(travel),
        };

        if let Some(index) = grid.node(next) {
            return Ok(Some(ChainOutcome {
                end: ChainEnd::Local(index),
                steps,
                weights,
                average,
                alias,
            }));
        }

        if let Some(link) = grid.link(next) {
            weights.push(link.weight(travel));
            if !link.average_chain_weights() {
                average = false;
            }
            if steps.is_empty() {
                alias = link.direction_alias(travel);
            }
            steps.push(next);

            match link.direction(travel) {
                Some(exit) => {
                    pos = next;
                    travel = exit;
                }
                None if steps.len() == 1 && lenient_first => return Ok(None),
                None => {
                    return Err(GridwayError::Topology {
                        message: format!(
                            "Map '{}': link '{}' at {} cannot be entered traveling {}",
                            map_name,
                            link.symbol(),
                            next,
                            travel
                        ),
                        help: Some(
                            "a link connected into from one side must define where it leads; \
                             use a crossing or router here"
                                .to_string(),
                        ),
                    });
                }
            }
            continue;
        }

        // Empty cell.
        if steps.is_empty() {
            return Ok(None);
        }
        let Some(&last_coord) = steps.last() else {
            return Ok(None);
        };
        let Some(last) = grid.link(last_coord) else {
            return Ok(None);
        };

        match last.empty_target() {
            EmptyTarget::Dangle => {
                return Err(GridwayError::Topology {
                    message: format!(
                        "Map '{}': link chain from {} dangles off the grid at {} heading {}",
                        map_name, origin, last_coord, travel
                    ),
                    help: Some("end every link chain at a node".to_string()),
                });
            }
            EmptyTarget::Pair => {
                let Some(partner) = last.partner() else {
                    return Err(GridwayError::Topology {
                        message: format!(
                            "Map '{}': teleporter '{}' at {} has no resolved partner",
                            map_name,
                            last.symbol(),
                            last_coord
                        ),
                        help: None,
                    });
                };
                jump = Some(partner);
            }
            EmptyTarget::Transition(target_map) => {
                return Ok(Some(ChainOutcome {
                    end: ChainEnd::Remote {
                        target_map,
                        via: last_coord,
                        symbol: last.symbol(),
                        travel,
                    },
                    steps,
                    weights,
                    average,
                    alias,
                }));
            }
        }
    }
}
