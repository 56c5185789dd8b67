//! Grid and world coordinates, and the compass directions that connect them.
//!
//! The map text uses two coordinate systems:
//! - *grid* coordinates count individual characters; links may sit anywhere,
//!   nodes only on even positions.
//! - *world* coordinates are the in-game positions: `X = x / 2, Y = y / 2`.
//!
//! y increases northward (upward on a printed map) in both systems.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight travel directions, in the order link resolution scans them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Compass {
    /// All directions in scan order.
    pub const ALL: [Compass; 8] = [
        Compass::North,
        Compass::Northeast,
        Compass::East,
        Compass::Southeast,
        Compass::South,
        Compass::Southwest,
        Compass::West,
        Compass::Northwest,
    ];

    /// Grid offset of one step of travel (north is +y).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Compass::North => (0, 1),
            Compass::Northeast => (1, 1),
            Compass::East => (1, 0),
            Compass::Southeast => (1, -1),
            Compass::South => (0, -1),
            Compass::Southwest => (-1, -1),
            Compass::West => (-1, 0),
            Compass::Northwest => (-1, 1),
        }
    }

    /// The reverse travel direction.
    pub fn opposite(self) -> Compass {
        match self {
            Compass::North => Compass::South,
            Compass::Northeast => Compass::Southwest,
            Compass::East => Compass::West,
            Compass::Southeast => Compass::Northwest,
            Compass::South => Compass::North,
            Compass::Southwest => Compass::Northeast,
            Compass::West => Compass::East,
            Compass::Northwest => Compass::Southeast,
        }
    }

    /// Short lowercase name used in direction lists ("n", "ne", ...).
    pub fn short_name(self) -> &'static str {
        match self {
            Compass::North => "n",
            Compass::Northeast => "ne",
            Compass::East => "e",
            Compass::Southeast => "se",
            Compass::South => "s",
            Compass::Southwest => "sw",
            Compass::West => "w",
            Compass::Northwest => "nw",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Fine per-character position in the map text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one step of travel away.
    pub fn step(self, dir: Compass) -> GridCoord {
        let (dx, dy) = dir.offset();
        GridCoord::new(self.x + dx, self.y + dy)
    }

    /// Whether both components are even (a legal node position).
    pub fn is_even(self) -> bool {
        self.x % 2 == 0 && self.y % 2 == 0
    }

    /// The world position of this cell, if it is a legal node position.
    pub fn to_world(self) -> Option<WorldCoord> {
        self.is_even()
            .then(|| WorldCoord::new(self.x / 2, self.y / 2))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Coarse in-game position; only nodes occupy world coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct WorldCoord {
    pub x: i32,
    pub y: i32,
}

impl WorldCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The grid cell this world position occupies.
    pub fn to_grid(self) -> GridCoord {
        GridCoord::new(self.x * 2, self.y * 2)
    }
}

impl fmt::Display for WorldCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl std::str::FromStr for WorldCoord {
    type Err = String;

    /// Parse `"X,Y"` (used by the CLI and the rooms table).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
        let x = x
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid X coordinate '{}'", x.trim()))?;
        let y = y
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid Y coordinate '{}'", y.trim()))?;
        Ok(WorldCoord::new(x, y))
    }
}
