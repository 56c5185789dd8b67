//! Core data model: coordinates, node and link behaviors, and the legend.

pub mod coord;
pub mod legend;
pub mod link;
pub mod node;

pub use coord::{Compass, GridCoord, WorldCoord};
pub use legend::Legend;
pub use link::{
    CellKind, DirectionMap, EmptyTarget, LinkKind, MapLink, Neighborhood, SmartLink, SmartPolicy,
    StaticLink, TeleporterLink, TransitionLink, IMPASSABLE,
};
pub use node::{BasicNode, ExitTarget, InterruptNode, MapNode, NodeKind, ResolvedExit};
