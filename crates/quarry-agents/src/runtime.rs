//! Agent loop — read a view, decide, answer, think, repeat.

use crate::heuristic::decide;
use quarry_core::error::Result;
use quarry_core::protocol::{MoveRequest, WorldView};
use quarry_core::types::{MapSize, Role};
use rand::Rng;
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Random pause between answering a view and reading the next one.
///
/// Agents run concurrently with each other; the pause spreads their
/// answers out so the coordinator sees them arrive in varying orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkDelay {
    min_ms: u64,
    max_ms: u64,
}

impl ThinkDelay {
    /// No pause at all.
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// Uniform pause in `[min_ms, max_ms]` milliseconds. Bounds are swapped if reversed.
    pub fn between_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for ThinkDelay {
    fn default() -> Self {
        Self::between_millis(10, 90)
    }
}

/// One hunter or prey process worth of behavior.
#[derive(Debug, Clone)]
pub struct AgentRuntime {
    role: Role,
    size: MapSize,
    think: ThinkDelay,
}

impl AgentRuntime {
    pub fn new(role: Role, size: MapSize) -> Self {
        Self {
            role,
            size,
            think: ThinkDelay::default(),
        }
    }

    pub fn with_think_delay(mut self, think: ThinkDelay) -> Self {
        self.think = think;
        self
    }

    /// Answer a single view.
    pub fn turn(&self, view: &WorldView) -> MoveRequest {
        decide(view, self.role, self.size)
    }

    /// Serve views from `input` until it closes. Returns the number of turns played.
    ///
    /// A clean end of stream between messages is the normal way out; a
    /// stream that ends mid-message or fails is an error.
    pub fn run<R: Read, W: Write>(&self, mut input: R, mut output: W) -> Result<u64> {
        let mut rng = rand::thread_rng();
        let mut turns = 0;

        while let Some(view) = WorldView::read_from(&mut input)? {
            let request = self.turn(&view);
            debug!(
                role = %self.role,
                at = %view.position,
                adversary = %view.adversary,
                blocked = view.objects().len(),
                to = %request.destination,
                "turn"
            );
            request.write_to(&mut output)?;
            turns += 1;

            let pause = self.think.sample(&mut rng);
            if !pause.is_zero() {
                trace!(?pause, "thinking");
                thread::sleep(pause);
            }
        }

        Ok(turns)
    }
}
