//! # Quarry Runtime
//!
//! The coordinator side of a Quarry simulation. It starts one agent
//! process per unit, waits on all their channels at once, resolves each
//! move request through the rule engine, and stops once one side has no
//! live units left.
//!
//! ## Modules
//!
//! - [`rules`] — move resolution: collisions, deaths, energy transfer
//! - [`channel`] — coordinator end of an agent's socket
//! - [`supervisor`] — agent process spawn, kill and reap
//! - [`dispatcher`] — the readiness-driven event loop
//! - [`sink`] — where rendered frames go
//! - [`config`] — run settings and the final report

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod rules;
pub mod sink;
pub mod supervisor;

pub use config::{RunConfig, RunOutcome, RunReport};
pub use dispatcher::{CycleSummary, Dispatcher};
pub use error::{RuntimeError, RuntimeResult};
pub use sink::{Discard, GridPrinter, ViewSink};
pub use supervisor::{AgentPrograms, Supervisor};

use quarry_core::world::World;

/// Run `world` to completion with real agent processes.
///
/// Every agent that was started is terminated and reaped before this
/// returns, whether the run finished or failed.
pub async fn run_world<S: ViewSink>(
    world: World,
    programs: AgentPrograms,
    config: RunConfig,
    sink: S,
) -> RuntimeResult<RunReport> {
    let mut dispatcher = Dispatcher::new(world, Supervisor::new(programs), sink, config);
    let outcome = async {
        dispatcher.launch().await?;
        dispatcher.run().await
    }
    .await;
    dispatcher.shutdown().await;
    outcome.map(|outcome| dispatcher.report(outcome))
}
