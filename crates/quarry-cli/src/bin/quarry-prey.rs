//! Prey agent: runs from the nearest hunter.

use quarry_core::types::Role;

fn main() -> anyhow::Result<()> {
    quarry_agents::cli::main(Role::Prey)
}
