//! Render the world as a bordered character grid.
//!
//! ```text
//! +---+
//! |H X|
//! |  P|
//! +---+
//! ```
//!
//! Rows are `y`, columns are `x`. Obstacles draw as `X`, live hunters as
//! `H`, live prey as `P`. Dead units are not drawn.

use crate::world::World;

/// Render `world` to a string, one line per row plus the two border lines.
pub fn render(world: &World) -> String {
    let size = world.size();
    let width = usize::try_from(size.width).unwrap_or(0);
    let height = usize::try_from(size.height).unwrap_or(0);

    let mut grid = vec![vec![' '; width]; height];
    let cells = world
        .live_units()
        .map(|(_, u)| (u.position, u.role.glyph()))
        .chain(world.obstacles().iter().map(|o| (*o, 'X')));
    for (at, glyph) in cells {
        if size.contains(at) {
            grid[at.y as usize][at.x as usize] = glyph;
        }
    }

    let border = format!("+{}+\n", "-".repeat(width));
    let mut out = String::with_capacity((width + 3) * (height + 2));
    out.push_str(&border);
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn renders_border_obstacles_and_units() {
        let mut world = World::new(MapSize::new(3, 2), vec![Coordinate::new(2, 0)]);
        world.add_unit(Role::Hunter, Coordinate::new(0, 0), 5);
        world.add_unit(Role::Prey, Coordinate::new(2, 1), 5);

        assert_eq!(render(&world), "+---+\n|H X|\n|  P|\n+---+\n");
    }

    #[test]
    fn dead_units_are_not_drawn() {
        let mut world = World::new(MapSize::new(2, 1), Vec::new());
        let prey = world.add_unit(Role::Prey, Coordinate::new(1, 0), 5);
        world.add_unit(Role::Hunter, Coordinate::new(0, 0), 5);
        world.kill(prey);

        assert_eq!(render(&world), "+--+\n|H |\n+--+\n");
    }
}
