//! Greedy distance heuristic.
//!
//! Hunters chase: they take the first neighbor that strictly shortens the
//! Manhattan distance to the nearest prey. Prey flee: they take the first
//! neighbor that strictly lengthens the distance to the nearest hunter.
//! Blocked cells (obstacles, allies) are skipped. With no such neighbor the
//! agent asks to stay where it is.

use quarry_core::protocol::{MoveRequest, WorldView};
use quarry_core::types::{MapSize, Role};

/// Pick the next move for a unit of `role` given what it can see.
pub fn decide(view: &WorldView, role: Role, size: MapSize) -> MoveRequest {
    let current = view.position.distance(&view.adversary);

    let choice = size
        .neighbors(view.position)
        .filter(|cell| !view.is_blocked(*cell))
        .find(|cell| {
            let next = cell.distance(&view.adversary);
            match role {
                Role::Hunter => next < current,
                Role::Prey => next > current,
            }
        });

    MoveRequest::new(choice.unwrap_or(view.position))
}
