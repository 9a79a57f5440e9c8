//! Configuration for the Quarry CLI, read from `quarry.toml`.
//!
//! ```toml
//! [agents]
//! hunter = "/usr/local/bin/quarry-hunter"
//! prey = "/usr/local/bin/quarry-prey"
//! think_min_ms = 0
//! think_max_ms = 20
//!
//! [run]
//! max_cycles = 500
//! render = true
//! ```
//!
//! Every field is optional. Command-line flags win over the file.

use anyhow::{Context, Result};
use quarry_runtime::AgentPrograms;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "quarry.toml";

/// Quarry project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    pub hunter: Option<PathBuf>,
    pub prey: Option<PathBuf>,
    /// Passed to agents as `QUARRY_THINK_MIN_MS`.
    pub think_min_ms: Option<u64>,
    /// Passed to agents as `QUARRY_THINK_MAX_MS`.
    pub think_max_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSection {
    pub max_cycles: Option<u64>,
    #[serde(default = "default_render")]
    pub render: bool,
}

fn default_render() -> bool {
    true
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_cycles: None,
            render: default_render(),
        }
    }
}

impl Config {
    /// Load config from quarry.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        match find_config_file(&cwd) {
            Some(path) => Self::from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Agent programs to run, with explicit paths taking precedence over
    /// the file and the file over the programs installed beside `quarry`.
    pub fn agent_programs(
        &self,
        hunter: Option<PathBuf>,
        prey: Option<PathBuf>,
    ) -> Result<AgentPrograms> {
        let installed = AgentPrograms::beside_current_exe()
            .context("Failed to locate the quarry executable")?;
        let hunter = hunter
            .or_else(|| self.agents.hunter.clone())
            .unwrap_or(installed.hunter);
        let prey = prey
            .or_else(|| self.agents.prey.clone())
            .unwrap_or(installed.prey);

        let mut programs = AgentPrograms::new(hunter, prey);
        if let Some(ms) = self.agents.think_min_ms {
            programs = programs.with_env("QUARRY_THINK_MIN_MS", ms.to_string());
        }
        if let Some(ms) = self.agents.think_max_ms {
            programs = programs.with_env("QUARRY_THINK_MAX_MS", ms.to_string());
        }
        Ok(programs)
    }
}

/// Find quarry.toml in `start` or its parent directories.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
