//! Error types for the coordinator.
//!
//! Every variant here ends the run. Agent crashes and bad move requests
//! are not errors: the dispatcher and rule engine absorb them.

use quarry_core::types::{Role, UnitId};
use std::io;
use thiserror::Error;

/// Result type for coordinator operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Fatal coordinator failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The duplex channel for an agent could not be created.
    #[error("failed to create channel for agent {unit}: {source}")]
    Channel { unit: UnitId, source: io::Error },

    /// The agent process could not be started.
    #[error("failed to start {role} agent {unit} from {program}: {source}")]
    Spawn {
        unit: UnitId,
        role: Role,
        program: String,
        source: io::Error,
    },

    /// Sending to or receiving from an agent failed at the OS level.
    #[error("transport failure on agent {unit}: {source}")]
    Transport { unit: UnitId, source: io::Error },

    /// Waiting for channel readiness failed.
    #[error("readiness wait failed: {0}")]
    Readiness(#[source] io::Error),

    /// Live units remain but none has an open channel to wait on.
    #[error("no open agent channel to wait on while {live} units are alive")]
    NoChannels { live: usize },

    /// Writing the rendered grid failed.
    #[error("failed to render the world: {0}")]
    Render(#[source] io::Error),
}
