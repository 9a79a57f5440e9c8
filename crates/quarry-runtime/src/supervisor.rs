//! Agent process lifecycle.
//!
//! One child process per unit, started as `<program> <width> <height>` with
//! its stdin and stdout both bound to the agent end of a fresh socket pair.
//! The supervisor keeps the child handles so every process it started is
//! eventually killed and reaped exactly once.

use crate::channel::AgentChannel;
use crate::error::{RuntimeError, RuntimeResult};
use quarry_core::types::{MapSize, Role, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// File name of the hunter agent program.
pub const HUNTER_PROGRAM: &str = "quarry-hunter";

/// File name of the prey agent program.
pub const PREY_PROGRAM: &str = "quarry-prey";

/// Which executables to run for each role, and what to pass them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPrograms {
    pub hunter: PathBuf,
    pub prey: PathBuf,
    /// Extra environment for every agent process.
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

impl AgentPrograms {
    pub fn new(hunter: impl Into<PathBuf>, prey: impl Into<PathBuf>) -> Self {
        Self {
            hunter: hunter.into(),
            prey: prey.into(),
            env: Vec::new(),
        }
    }

    /// The agent programs installed next to the running executable.
    pub fn beside_current_exe() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(HUNTER_PROGRAM), dir.join(PREY_PROGRAM)))
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self, role: Role) -> &Path {
        match role {
            Role::Hunter => &self.hunter,
            Role::Prey => &self.prey,
        }
    }
}

/// Starts, tracks and reaps agent processes.
#[derive(Debug)]
pub struct Supervisor {
    programs: AgentPrograms,
    processes: BTreeMap<UnitId, Child>,
}

impl Supervisor {
    pub fn new(programs: AgentPrograms) -> Self {
        Self {
            programs,
            processes: BTreeMap::new(),
        }
    }

    /// Start the agent for `unit` and return the coordinator end of its
    /// channel.
    ///
    /// The agent end is closed in this process before returning, so the
    /// channel reports a hangup as soon as the child exits.
    pub fn spawn(&mut self, unit: UnitId, role: Role, size: MapSize) -> RuntimeResult<AgentChannel> {
        let channel_err = |source| RuntimeError::Channel { unit, source };
        let (ours, theirs) = StdUnixStream::pair().map_err(channel_err)?;
        let program = self.programs.program(role);

        let child = {
            let stdin = OwnedFd::from(theirs.try_clone().map_err(channel_err)?);
            let stdout = OwnedFd::from(theirs);
            let mut command = Command::new(program);
            command
                .arg(size.width.to_string())
                .arg(size.height.to_string())
                .envs(self.programs.env.iter().map(|(k, v)| (k, v)))
                .stdin(Stdio::from(stdin))
                .stdout(Stdio::from(stdout))
                .stderr(Stdio::inherit())
                .kill_on_drop(true);
            command.spawn().map_err(|source| RuntimeError::Spawn {
                unit,
                role,
                program: program.display().to_string(),
                source,
            })?
        };

        info!(
            "Spawned {} agent for unit {} (pid {:?})",
            role,
            unit,
            child.id()
        );
        self.processes.insert(unit, child);
        AgentChannel::from_std(ours).map_err(channel_err)
    }

    /// Kill and reap the agent for `unit`.
    ///
    /// Returns the exit status the first time; later calls, and units whose
    /// agent was never spawned here, return `None`.
    pub async fn terminate(&mut self, unit: UnitId) -> Option<ExitStatus> {
        let mut child = self.processes.remove(&unit)?;
        if let Err(e) = child.start_kill() {
            // Already exited on its own; still needs reaping.
            debug!("Kill of agent {} skipped: {}", unit, e);
        }
        match child.wait().await {
            Ok(status) => {
                debug!("Reaped agent {}: {}", unit, status);
                Some(status)
            }
            Err(e) => {
                warn!("Failed to reap agent {}: {}", unit, e);
                None
            }
        }
    }

    /// Terminate every agent still running, in roster order.
    pub async fn shutdown(&mut self) {
        let units: Vec<UnitId> = self.processes.keys().copied().collect();
        for unit in units {
            self.terminate(unit).await;
        }
    }

    /// Units whose agent process has not been terminated yet.
    pub fn running(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.processes.keys().copied()
    }

    pub fn running_count(&self) -> usize {
        self.processes.len()
    }
}
