//! Rule engine — turns one move request into one world mutation.
//!
//! Rules are evaluated in a fixed order and the first one that applies
//! wins:
//!
//! 0. A destination that is neither the mover's own cell nor one of its
//!    in-bounds neighbors, or that holds an obstacle, is rejected as if
//!    the agent had asked to stay.
//! 1. Collision with another live unit (first in roster order):
//!    - same role: rejected, nothing changes;
//!    - hunter onto prey: the hunter moves, pays 1 energy, then gains the
//!      prey's energy; the prey dies; the hunter dies too if its energy is
//!      still ≤ 0 afterward;
//!    - prey onto hunter: the prey moves, the hunter gains the prey's
//!      energy, the prey dies. Prey pay nothing to move.
//! 2. Destination is the mover's own cell: stay, nothing changes.
//! 3. Plain move: commit, hunters pay 1 energy and die at ≤ 0 on the new
//!    cell.
//!
//! Energy arithmetic saturates at the bounds of
//! [`Energy`](quarry_core::types::Energy).
//!
//! The engine only touches the [`World`]. Terminating the processes of
//! units that died is the dispatcher's job.

use quarry_core::types::{Coordinate, Role, UnitId};
use quarry_core::world::World;
use serde::Serialize;

/// Energy a hunter pays for every committed move.
pub const MOVE_COST: i64 = 1;

/// Why a unit died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DeathCause {
    /// A hunter stepped onto this prey.
    Eaten { by: UnitId },
    /// This prey stepped onto a hunter.
    Fed { hunter: UnitId },
    /// A hunter ran out of energy.
    Exhausted,
    /// The agent process went away on its own.
    Disconnected,
}

/// A unit that died, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Death {
    pub unit: UnitId,
    pub cause: DeathCause,
}

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The mover is already dead.
    Dead,
    /// Not the mover's cell nor an in-bounds neighbor.
    OutOfReach,
    /// The destination holds an obstacle.
    Obstacle,
    /// A live unit of the same role holds the destination.
    Ally(UnitId),
}

/// What happened to the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Rejected(Rejection),
    Stayed,
    Moved,
    Ate { prey: UnitId },
    Fed { hunter: UnitId },
}

/// Result of resolving one move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: MoveOutcome,
    /// The request was legal (stays included).
    pub accepted: bool,
    /// Positions or liveness changed; the rendered view is stale.
    pub world_changed: bool,
    /// Units that died, in the order they died.
    pub deaths: Vec<Death>,
}

impl Resolution {
    fn unchanged(outcome: MoveOutcome) -> Self {
        Self {
            accepted: !matches!(outcome, MoveOutcome::Rejected(_)),
            outcome,
            world_changed: false,
            deaths: Vec::new(),
        }
    }

    fn changed(outcome: MoveOutcome, deaths: Vec<Death>) -> Self {
        Self {
            outcome,
            accepted: true,
            world_changed: true,
            deaths,
        }
    }
}

/// Resolve `mover`'s request to go to `destination`, mutating `world`.
pub fn resolve_move(world: &mut World, mover: UnitId, destination: Coordinate) -> Resolution {
    if let Some(rejection) = check_reach(world, mover, destination) {
        return Resolution::unchanged(MoveOutcome::Rejected(rejection));
    }

    if let Some(occupant) = world.live_occupant(destination, mover) {
        return collide(world, mover, occupant, destination);
    }

    if world.unit(mover).position == destination {
        return Resolution::unchanged(MoveOutcome::Stayed);
    }

    let unit = world.unit_mut(mover);
    unit.position = destination;
    if unit.is_hunter() {
        unit.energy = unit.energy.saturating_sub(MOVE_COST);
    }

    let mut deaths = Vec::new();
    if unit.energy <= 0 {
        world.kill(mover);
        deaths.push(Death {
            unit: mover,
            cause: DeathCause::Exhausted,
        });
    }
    Resolution::changed(MoveOutcome::Moved, deaths)
}

fn check_reach(world: &World, mover: UnitId, destination: Coordinate) -> Option<Rejection> {
    let unit = world.unit(mover);
    if !unit.alive {
        return Some(Rejection::Dead);
    }
    if destination == unit.position {
        return None;
    }
    if !world.size().is_neighbor(unit.position, destination) {
        return Some(Rejection::OutOfReach);
    }
    if world.is_obstacle(destination) {
        return Some(Rejection::Obstacle);
    }
    None
}

fn collide(world: &mut World, mover: UnitId, occupant: UnitId, destination: Coordinate) -> Resolution {
    let mover_role = world.unit(mover).role;
    if mover_role == world.unit(occupant).role {
        return Resolution::unchanged(MoveOutcome::Rejected(Rejection::Ally(occupant)));
    }

    let mut deaths = Vec::new();
    match mover_role {
        Role::Hunter => {
            let prey_energy = world.unit(occupant).energy;
            let hunter = world.unit_mut(mover);
            hunter.position = destination;
            hunter.energy = hunter.energy.saturating_sub(MOVE_COST);
            hunter.energy = hunter.energy.saturating_add(prey_energy);
            let exhausted = hunter.energy <= 0;

            world.kill(occupant);
            deaths.push(Death {
                unit: occupant,
                cause: DeathCause::Eaten { by: mover },
            });
            if exhausted {
                world.kill(mover);
                deaths.push(Death {
                    unit: mover,
                    cause: DeathCause::Exhausted,
                });
            }
            Resolution::changed(MoveOutcome::Ate { prey: occupant }, deaths)
        }
        Role::Prey => {
            let prey = world.unit_mut(mover);
            prey.position = destination;
            let prey_energy = prey.energy;

            let hunter = world.unit_mut(occupant);
            hunter.energy = hunter.energy.saturating_add(prey_energy);
            world.kill(mover);
            deaths.push(Death {
                unit: mover,
                cause: DeathCause::Fed { hunter: occupant },
            });
            Resolution::changed(MoveOutcome::Fed { hunter: occupant }, deaths)
        }
    }
}
