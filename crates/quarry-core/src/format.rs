//! Textual world description.
//!
//! A world is a whitespace-separated list of integers:
//!
//! ```text
//! <width> <height>
//! <num_obstacles>
//! <x> <y>            (num_obstacles times)
//! <num_hunters>
//! <x> <y> <energy>   (num_hunters times)
//! <num_prey>
//! <x> <y> <energy>   (num_prey times)
//! ```
//!
//! Hunters are added to the roster before prey, in file order.

use crate::error::ParseError;
use crate::types::*;
use crate::world::World;
use std::collections::HashSet;
use std::str::{FromStr, SplitWhitespace};

impl FromStr for World {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens::new(s);

        let width = tokens.int("map width")?;
        let height = tokens.int("map height")?;
        if width <= 0 || height <= 0 {
            return Err(ParseError::InvalidDimensions { width, height });
        }
        let size = MapSize::new(width, height);

        let obstacle_count = tokens.count("obstacle")?;
        let mut obstacles = Vec::with_capacity(obstacle_count.min(1024));
        for _ in 0..obstacle_count {
            let at = tokens.coordinate("obstacle")?;
            if !size.contains(at) {
                return Err(ParseError::OutOfBounds { what: "obstacle", at });
            }
            obstacles.push(at);
        }

        let mut world = World::new(size, obstacles);
        let mut occupied = HashSet::new();
        for role in [Role::Hunter, Role::Prey] {
            let what = match role {
                Role::Hunter => "hunter",
                Role::Prey => "prey",
            };
            for _ in 0..tokens.count(what)? {
                let at = tokens.coordinate(what)?;
                let energy = tokens.energy()?;
                if !size.contains(at) {
                    return Err(ParseError::OutOfBounds { what, at });
                }
                if world.is_obstacle(at) {
                    return Err(ParseError::OnObstacle { at });
                }
                if !occupied.insert(at) {
                    return Err(ParseError::Overlap { at });
                }
                world.add_unit(role, at, energy);
            }
        }

        if let Some(token) = tokens.inner.next() {
            return Err(ParseError::TrailingInput {
                token: token.to_string(),
            });
        }

        Ok(world)
    }
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            inner: s.split_whitespace(),
        }
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let token = self
            .inner
            .next()
            .ok_or(ParseError::UnexpectedEnd { expected })?;
        token.parse().map_err(|_| ParseError::InvalidInteger {
            expected,
            token: token.to_string(),
        })
    }

    fn int(&mut self, expected: &'static str) -> Result<i32, ParseError> {
        self.next(expected)
    }

    fn count(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let count: i64 = self.next("count")?;
        usize::try_from(count).map_err(|_| ParseError::InvalidCount { what, count })
    }

    fn coordinate(&mut self, what: &'static str) -> Result<Coordinate, ParseError> {
        let x = self.int(what)?;
        let y = self.int(what)?;
        Ok(Coordinate::new(x, y))
    }

    fn energy(&mut self) -> Result<Energy, ParseError> {
        self.next("energy")
    }
}
