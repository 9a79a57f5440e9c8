//! # Quarry Core
//!
//! Shared types for the Quarry predator/prey simulation.
//!
//! A coordinator owns the authoritative [`World`](world::World); hunters and
//! prey run as separate processes and only ever see a
//! [`WorldView`](protocol::WorldView) snapshot. This crate holds everything
//! both sides agree on:
//!
//! - **types** — coordinates, map size, roles, units
//! - **world** — the roster and its queries (distance, neighbors,
//!   nearest adversary, blocking cells)
//! - **protocol** — the two fixed-layout binary messages
//! - **format** — the textual world description
//! - **render** — the bordered character grid
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry_core::prelude::*;
//!
//! let world: World = "3 3\n0\n1\n0 0 5\n1\n2 2 5\n".parse().unwrap();
//! let hunter = UnitId(0);
//!
//! let view = world.view_for(hunter);
//! assert_eq!(view.adversary, Coordinate::new(2, 2));
//! assert_eq!(view.encode().len(), WORLD_VIEW_LEN);
//! ```

pub mod error;
pub mod format;
pub mod prelude;
pub mod protocol;
pub mod render;
pub mod types;
pub mod world;
