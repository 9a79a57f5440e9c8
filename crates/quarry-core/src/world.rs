//! World — the authoritative grid state.
//!
//! The world is built once at startup and then mutated only by the
//! coordinator's rule engine. It holds the map size, an immutable obstacle
//! set, and the ordered roster of units. Roster order matters: it is the
//! order agents are polled in, and the order every "first found" scan
//! (nearest adversary, collision target) walks.

use crate::protocol::{WorldView, MAX_OBJECTS};
use crate::types::*;
use serde::Serialize;

/// Grid dimensions, obstacles and the unit roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct World {
    size: MapSize,
    obstacles: Vec<Coordinate>,
    units: Vec<Unit>,
}

impl World {
    /// Create an empty world with the given obstacles.
    pub fn new(size: MapSize, obstacles: Vec<Coordinate>) -> Self {
        Self {
            size,
            obstacles,
            units: Vec::new(),
        }
    }

    /// Append a unit to the roster and return its id.
    pub fn add_unit(&mut self, role: Role, position: Coordinate, energy: Energy) -> UnitId {
        self.units.push(Unit::new(role, position, energy));
        UnitId(self.units.len() - 1)
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn obstacles(&self) -> &[Coordinate] {
        &self.obstacles
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units in the roster, dead or alive.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Get a unit by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this world's roster.
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    /// Get a mutable unit by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this world's roster.
    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.0]
    }

    /// All ids in roster order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len()).map(UnitId)
    }

    /// Live units with their ids, in roster order.
    pub fn live_units(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.alive)
            .map(|(i, u)| (UnitId(i), u))
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.units.get(id.0).map_or(false, |u| u.alive)
    }

    /// Mark a unit dead. Its position and energy are kept.
    pub fn kill(&mut self, id: UnitId) {
        self.units[id.0].alive = false;
    }

    pub fn is_obstacle(&self, c: Coordinate) -> bool {
        self.obstacles.contains(&c)
    }

    /// First live unit other than `except` standing on `c`, in roster order.
    pub fn live_occupant(&self, c: Coordinate, except: UnitId) -> Option<UnitId> {
        self.live_units()
            .find(|(id, u)| *id != except && u.position == c)
            .map(|(id, _)| id)
    }

    /// Number of live units with the given role.
    pub fn live_count(&self, role: Role) -> usize {
        self.live_units().filter(|(_, u)| u.role == role).count()
    }

    /// A world is stable once either side has no live units left.
    pub fn is_stable(&self) -> bool {
        self.live_count(Role::Hunter) == 0 || self.live_count(Role::Prey) == 0
    }

    /// Position of the closest live adversary of `id`.
    ///
    /// Ties go to the adversary found first in roster order.
    pub fn nearest_adversary(&self, id: UnitId) -> Option<Coordinate> {
        let me = self.unit(id);
        let wanted = me.role.adversary();
        let mut best: Option<(u64, Coordinate)> = None;

        for (_, other) in self.live_units() {
            if other.role != wanted {
                continue;
            }
            let d = me.position.distance(&other.position);
            if best.map_or(true, |(min, _)| d < min) {
                best = Some((d, other.position));
            }
        }

        best.map(|(_, pos)| pos)
    }

    /// Neighbor cells of `id` that it cannot step into.
    ///
    /// A neighbor blocks if it is an obstacle or holds a live ally.
    /// Adversaries never block. At most [`MAX_OBJECTS`] cells are returned,
    /// in neighbor order.
    pub fn blocking_neighbors(&self, id: UnitId) -> Vec<Coordinate> {
        let me = self.unit(id);
        self.size
            .neighbors(me.position)
            .filter(|&cell| self.is_obstacle(cell) || self.holds_ally(cell, me.role))
            .take(MAX_OBJECTS)
            .collect()
    }

    fn holds_ally(&self, cell: Coordinate, role: Role) -> bool {
        self.live_units()
            .any(|(_, u)| u.role == role && u.position == cell)
    }

    /// Build the world-view message sent to unit `id`.
    ///
    /// With no live adversary left, the unit's own position stands in for it.
    pub fn view_for(&self, id: UnitId) -> WorldView {
        let me = self.unit(id);
        let adversary = self.nearest_adversary(id).unwrap_or(me.position);
        WorldView::new(me.position, adversary, &self.blocking_neighbors(id))
    }
}
