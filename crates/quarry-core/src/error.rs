//! Error types for Quarry operations.

use crate::types::Coordinate;
use thiserror::Error;

/// Result type for Quarry core operations.
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Errors that can occur in the shared core.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// The world description could not be parsed.
    #[error("World format error: {0}")]
    Parse(#[from] ParseError),

    /// A wire message was malformed.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// I/O errors on a channel or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading a world description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended while a value was still expected.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// A token was not an integer.
    #[error("invalid {expected}: {token:?} is not an integer")]
    InvalidInteger { expected: &'static str, token: String },

    /// A count field was negative.
    #[error("invalid {what} count {count}")]
    InvalidCount { what: &'static str, count: i64 },

    /// Width or height was not positive.
    #[error("map dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// An obstacle or unit was placed outside the map.
    #[error("{what} at {at} lies outside the map")]
    OutOfBounds { what: &'static str, at: Coordinate },

    /// A unit was placed on an obstacle.
    #[error("unit at {at} is placed on an obstacle")]
    OnObstacle { at: Coordinate },

    /// Two units share a cell.
    #[error("more than one unit placed at {at}")]
    Overlap { at: Coordinate },

    /// Input continued after the prey roster.
    #[error("unexpected trailing input {token:?}")]
    TrailingInput { token: String },
}

/// Errors raised while decoding a wire message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The object count field is outside `0..=4`.
    #[error("object count {0} exceeds message capacity")]
    InvalidObjectCount(i32),

    /// A stream ended in the middle of a message.
    #[error("stream closed after {read} of {expected} bytes")]
    Truncated { read: usize, expected: usize },
}
