//! Shared value types used across all Quarry crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy carried by a unit. May go non-positive, which is fatal to its holder.
pub type Energy = i64;

/// Neighbor offsets in the order agents consider them.
///
/// The order is observable: when several moves are equally good the agent
/// heuristic takes the first one, so changing it changes the simulation.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];

/// A cell on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    pub fn distance(&self, other: &Coordinate) -> u64 {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.y.abs_diff(other.y))
    }

    /// Offset this cell, returning `None` on integer overflow.
    pub fn offset(&self, dx: i32, dy: i32) -> Option<Coordinate> {
        Some(Coordinate::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the grid. Valid cells are `[0, width) × [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    pub width: i32,
    pub height: i32,
}

impl MapSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether a cell lies inside the map.
    pub fn contains(&self, c: Coordinate) -> bool {
        (0..self.width).contains(&c.x) && (0..self.height).contains(&c.y)
    }

    /// The in-bounds axis-aligned neighbors of a cell, in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, c: Coordinate) -> impl Iterator<Item = Coordinate> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| c.offset(dx, dy))
            .filter(move |n| self.contains(*n))
    }

    /// Whether `to` is one of the in-bounds neighbors of `from`.
    pub fn is_neighbor(&self, from: Coordinate, to: Coordinate) -> bool {
        self.neighbors(from).any(|n| n == to)
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which side a unit plays for. Fixed for the unit's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hunter,
    Prey,
}

impl Role {
    /// The role this one chases or flees from.
    pub fn adversary(&self) -> Role {
        match self {
            Role::Hunter => Role::Prey,
            Role::Prey => Role::Hunter,
        }
    }

    /// Grid glyph for a live unit of this role.
    pub fn glyph(&self) -> char {
        match self {
            Role::Hunter => 'H',
            Role::Prey => 'P',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Hunter => write!(f, "hunter"),
            Role::Prey => write!(f, "prey"),
        }
    }
}

/// Position of a unit in the roster.
///
/// Roster order is polling order and tie-break order, so ids compare by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl UnitId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A hunter or prey on the grid.
///
/// Dead units keep their last position and energy for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub role: Role,
    pub position: Coordinate,
    pub energy: Energy,
    pub alive: bool,
}

impl Unit {
    pub fn new(role: Role, position: Coordinate, energy: Energy) -> Self {
        Self {
            role,
            position,
            energy,
            alive: true,
        }
    }

    pub fn is_hunter(&self) -> bool {
        self.role == Role::Hunter
    }
}
