//! Hunter agent: chases the nearest prey.

use quarry_core::types::Role;

fn main() -> anyhow::Result<()> {
    quarry_agents::cli::main(Role::Hunter)
}
