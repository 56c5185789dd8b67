//! gridway - ASCII grid map parser and pathfinder
//!
//! A library for parsing ASCII grid map definitions into navigable world
//! graphs: nodes on a coarse world grid, glyph links chaining between them,
//! shortest-path queries with caching, and character-grid views.

pub mod cli;
pub mod error;
pub mod map;
pub mod parser;
pub mod pathfind;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod types;
pub mod validation;

pub use error::{GridwayError, Result};
pub use map::{MapConfig, WorldMap};
pub use parser::{parse_documents, parse_map_file};
pub use pathfind::{PathCache, PathData, PathElement};
pub use registry::MapRegistry;
pub use render::{RangeMode, ViewOptions};
pub use types::{
    BasicNode, Compass, DirectionMap, EmptyTarget, ExitTarget, GridCoord, InterruptNode, Legend,
    LinkKind, MapLink, MapNode, Neighborhood, NodeKind, ResolvedExit, SmartLink, StaticLink,
    TeleporterLink, TransitionLink, WorldCoord, IMPASSABLE,
};
pub use validation::{validate_registry, Diagnostic, Severity, ValidationResult};
