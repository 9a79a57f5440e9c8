//! Event loop — serializes concurrent agents into one world.
//!
//! Each cycle waits, with no timeout, until at least one agent channel is
//! readable. It then walks the roster in order. Every live agent with a
//! pending request gets exactly one request resolved against the current
//! world, and a fresh view back if it survived. Later agents in the same
//! scan see the mutations made by earlier ones. The world is rendered at
//! most once per scan, and only if something changed.
//!
//! Strict alternation per agent falls out of the protocol: an agent only
//! writes after reading a view, and it only gets a view after its last
//! request was resolved.

use crate::channel::{AgentChannel, ChannelSlot, Delivery, Inbound};
use crate::config::{survivors, RunConfig, RunOutcome, RunReport};
use crate::error::{RuntimeError, RuntimeResult};
use crate::rules::{resolve_move, Death, DeathCause, MoveOutcome};
use crate::sink::ViewSink;
use crate::supervisor::Supervisor;
use futures::future::select_all;
use quarry_core::types::UnitId;
use quarry_core::world::World;
use tracing::{debug, info, warn};

/// What one dispatch cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Requests received and resolved.
    pub requests: usize,
    /// Deaths during the cycle, crashes included.
    pub deaths: Vec<Death>,
    pub world_changed: bool,
    pub rendered: bool,
}

/// Owns the world, the agents and their channels for one run.
pub struct Dispatcher<S> {
    world: World,
    supervisor: Supervisor,
    slots: Vec<ChannelSlot>,
    sink: S,
    config: RunConfig,
    cycles: u64,
    requests: u64,
    renders: u64,
    deaths: Vec<Death>,
}

impl<S: ViewSink> Dispatcher<S> {
    pub fn new(world: World, supervisor: Supervisor, sink: S, config: RunConfig) -> Self {
        let slots = world.ids().map(|_| ChannelSlot::Disabled).collect();
        Self {
            world,
            supervisor,
            slots,
            sink,
            config,
            cycles: 0,
            requests: 0,
            renders: 0,
            deaths: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Deaths so far, in order.
    pub fn deaths(&self) -> &[Death] {
        &self.deaths
    }

    /// Whether `unit` still has an open channel.
    pub fn is_connected(&self, unit: UnitId) -> bool {
        self.slots
            .get(unit.index())
            .map_or(false, ChannelSlot::is_active)
    }

    /// Push the current world to the sink.
    pub fn render(&mut self) -> RuntimeResult<()> {
        self.sink
            .refresh(&self.world)
            .map_err(RuntimeError::Render)?;
        self.renders += 1;
        for (unit, u) in self.world.live_units() {
            debug!(
                "{} {} at {} with energy {}",
                u.role, unit, u.position, u.energy
            );
        }
        Ok(())
    }

    /// Render the starting world if configured, then start one agent
    /// process per live unit and send each its first view.
    ///
    /// Agents that hang up before their first view is delivered are buried
    /// here, and the world is rendered again once all agents are started.
    pub async fn launch(&mut self) -> RuntimeResult<()> {
        if self.config.render_initial {
            self.render()?;
        }
        let size = self.world.size();
        let roster: Vec<UnitId> = self.world.live_units().map(|(id, _)| id).collect();
        let mut changed = false;
        for unit in roster {
            let role = self.world.unit(unit).role;
            let channel = self.supervisor.spawn(unit, role, size)?;
            changed |= !self.attach(unit, channel).await?;
        }
        if changed {
            self.render()?;
        }
        info!("Launched {} agents on a {} map", self.supervisor.running_count(), size);
        Ok(())
    }

    /// Connect `unit` to an agent over `channel` and send its first view.
    ///
    /// [`launch`](Self::launch) does this for spawned processes. Calling it
    /// directly lets an agent live anywhere that can hold the other end.
    ///
    /// Returns `false` if the agent had already hung up; the unit is then
    /// dead.
    pub async fn attach(&mut self, unit: UnitId, channel: AgentChannel) -> RuntimeResult<bool> {
        self.slots[unit.index()] = ChannelSlot::Active(channel);
        self.send_view(unit).await
    }

    /// Run cycles until the world is stable or the cycle cap is hit.
    pub async fn run(&mut self) -> RuntimeResult<RunOutcome> {
        loop {
            if self.world.is_stable() {
                let outcome = RunOutcome::stable(&self.world);
                info!("World stable after {} cycles: {:?}", self.cycles, outcome);
                return Ok(outcome);
            }
            if let Some(max) = self.config.max_cycles {
                if self.cycles >= max {
                    info!("Stopping at the cycle limit ({})", max);
                    return Ok(RunOutcome::CycleLimit);
                }
            }
            self.run_cycle().await?;
        }
    }

    /// Wait for readiness, then serve every ready agent once in roster order.
    pub async fn run_cycle(&mut self) -> RuntimeResult<CycleSummary> {
        let first_death = self.deaths.len();
        let mut summary = CycleSummary::default();

        // Readiness can outlive the bytes that raised it; a scan that finds
        // nothing does not count as a cycle.
        while summary.requests == 0 && !summary.world_changed {
            self.wait_ready().await?;
            self.scan(&mut summary).await?;
        }

        summary.deaths = self.deaths[first_death..].to_vec();
        if summary.world_changed {
            self.render()?;
            summary.rendered = true;
        }
        self.cycles += 1;
        Ok(summary)
    }

    async fn scan(&mut self, summary: &mut CycleSummary) -> RuntimeResult<()> {
        let roster: Vec<UnitId> = self.world.ids().collect();
        for unit in roster {
            if !self.world.is_alive(unit) {
                continue;
            }
            let Some(channel) = self.slots[unit.index()].channel_mut() else {
                continue;
            };
            let inbound = channel
                .poll_request()
                .await
                .map_err(|source| RuntimeError::Transport { unit, source })?;

            let request = match inbound {
                Inbound::Pending => continue,
                Inbound::Closed => {
                    self.lose(unit).await;
                    summary.world_changed = true;
                    continue;
                }
                Inbound::Request(request) => request,
            };

            summary.requests += 1;
            self.requests += 1;
            let resolution = resolve_move(&mut self.world, unit, request.destination);
            match resolution.outcome {
                MoveOutcome::Rejected(why) => {
                    warn!("Rejected move of {} to {}: {:?}", unit, request.destination, why)
                }
                outcome => debug!("{} -> {}: {:?}", unit, request.destination, outcome),
            }
            summary.world_changed |= resolution.world_changed;

            for death in resolution.deaths {
                self.record_death(death);
                self.terminate(death.unit).await;
            }
            if self.world.is_alive(unit) && !self.send_view(unit).await? {
                summary.world_changed = true;
            }
        }
        Ok(())
    }

    /// Kill and reap `unit`'s agent and disable its channel slot.
    ///
    /// Safe to call any number of times.
    pub async fn terminate(&mut self, unit: UnitId) {
        self.supervisor.terminate(unit).await;
        if let Some(slot) = self.slots.get_mut(unit.index()) {
            *slot = ChannelSlot::Disabled;
        }
    }

    /// Terminate every agent, reporting the units still alive.
    pub async fn shutdown(&mut self) {
        for (unit, u) in self.world.live_units() {
            info!(
                "{} {} survived at {} with energy {}",
                u.role, unit, u.position, u.energy
            );
        }
        let roster: Vec<UnitId> = self.world.ids().collect();
        for unit in roster {
            self.terminate(unit).await;
        }
        self.supervisor.shutdown().await;
    }

    /// Summarize the run so far.
    pub fn report(&self, outcome: RunOutcome) -> RunReport {
        RunReport {
            outcome,
            cycles: self.cycles,
            requests: self.requests,
            renders: self.renders,
            deaths: self.deaths.clone(),
            survivors: survivors(&self.world),
        }
    }

    async fn wait_ready(&self) -> RuntimeResult<()> {
        let waits: Vec<_> = self
            .slots
            .iter()
            .filter_map(ChannelSlot::channel)
            .map(|channel| Box::pin(channel.readable()))
            .collect();
        if waits.is_empty() {
            return Err(RuntimeError::NoChannels {
                live: self.world.live_units().count(),
            });
        }
        let (ready, _, _) = select_all(waits).await;
        ready.map_err(RuntimeError::Readiness)
    }

    /// `Ok(false)` if the agent hung up and the unit was buried.
    async fn send_view(&mut self, unit: UnitId) -> RuntimeResult<bool> {
        let view = self.world.view_for(unit);
        let Some(channel) = self.slots[unit.index()].channel_mut() else {
            return Ok(true);
        };
        let delivery = channel
            .send(&view)
            .await
            .map_err(|source| RuntimeError::Transport { unit, source })?;
        if delivery == Delivery::Closed {
            self.lose(unit).await;
            return Ok(false);
        }
        Ok(true)
    }

    /// The agent for `unit` went away on its own.
    async fn lose(&mut self, unit: UnitId) {
        warn!("Agent for {} {} disconnected", self.world.unit(unit).role, unit);
        if self.world.is_alive(unit) {
            self.world.kill(unit);
            self.record_death(Death {
                unit,
                cause: DeathCause::Disconnected,
            });
        }
        self.terminate(unit).await;
    }

    fn record_death(&mut self, death: Death) {
        let u = self.world.unit(death.unit);
        info!(
            "{} {} died at {} with energy {} ({:?})",
            u.role, death.unit, u.position, u.energy, death.cause
        );
        self.deaths.push(death);
    }
}
