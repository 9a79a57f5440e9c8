//! Run settings and the end-of-run report.

use crate::rules::Death;
use quarry_core::types::{Coordinate, Energy, Role, UnitId};
use quarry_core::world::World;
use serde::{Deserialize, Serialize};

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop after this many dispatch cycles even if the world is not
    /// stable. `None` runs until stable.
    pub max_cycles: Option<u64>,
    /// Render the world once before any agent is started.
    pub render_initial: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: None,
            render_initial: true,
        }
    }
}

impl RunConfig {
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RunOutcome {
    /// One side (or both) has no live units. `winner` is the side with
    /// units left, if any.
    Stable { winner: Option<Role> },
    /// The cycle cap was reached first.
    CycleLimit,
}

/// A unit alive when the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Survivor {
    pub unit: UnitId,
    pub role: Role,
    pub position: Coordinate,
    pub energy: Energy,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Dispatch cycles completed.
    pub cycles: u64,
    /// Move requests received and resolved.
    pub requests: u64,
    /// Frames rendered, the initial one included.
    pub renders: u64,
    /// Deaths in the order they happened.
    pub deaths: Vec<Death>,
    pub survivors: Vec<Survivor>,
}

impl RunOutcome {
    /// Outcome for a world that is stable now.
    pub fn stable(world: &World) -> Self {
        let hunters = world.live_count(Role::Hunter);
        let prey = world.live_count(Role::Prey);
        let winner = match (hunters > 0, prey > 0) {
            (true, false) => Some(Role::Hunter),
            (false, true) => Some(Role::Prey),
            _ => None,
        };
        RunOutcome::Stable { winner }
    }
}

pub(crate) fn survivors(world: &World) -> Vec<Survivor> {
    world
        .live_units()
        .map(|(unit, u)| Survivor {
            unit,
            role: u.role,
            position: u.position,
            energy: u.energy,
        })
        .collect()
}
