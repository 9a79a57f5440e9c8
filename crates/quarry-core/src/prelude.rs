//! Quarry Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use quarry_core::prelude::*;
//! ```

pub use crate::types::{Coordinate, Energy, MapSize, Role, Unit, UnitId, NEIGHBOR_OFFSETS};

pub use crate::world::World;

pub use crate::protocol::{
    MoveRequest, WorldView, MAX_OBJECTS, MOVE_REQUEST_LEN, WORLD_VIEW_LEN,
};

pub use crate::render::render;

pub use crate::error::{ParseError, ProtocolError, QuarryError, Result};
