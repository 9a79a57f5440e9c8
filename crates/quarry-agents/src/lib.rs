//! # Quarry Agents
//!
//! The agent side of the Quarry simulation.
//!
//! An agent is a separate process that reads one
//! [`WorldView`](quarry_core::protocol::WorldView) from standard input,
//! answers with one [`MoveRequest`](quarry_core::protocol::MoveRequest) on
//! standard output, and repeats until the coordinator terminates it.
//!
//! - **heuristic** — the stateless greedy-distance decision
//! - **runtime** — the read/decide/write loop with a random think delay
//! - **cli** — the shared `main` for the hunter and prey programs

pub mod cli;
pub mod heuristic;
pub mod runtime;

pub use heuristic::decide;
pub use runtime::{AgentRuntime, ThinkDelay};
