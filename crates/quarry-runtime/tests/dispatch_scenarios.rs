//! Dispatcher scenarios with in-process agents.
//!
//! Each agent end is a plain blocking socket held by the test or by a
//! thread running the real agent loop, so every move is observable.

use quarry_agents::{AgentRuntime, ThinkDelay};
use quarry_core::prelude::*;
use quarry_runtime::channel::AgentChannel;
use quarry_runtime::rules::{Death, DeathCause};
use quarry_runtime::{AgentPrograms, Dispatcher, RunConfig, RunOutcome, Supervisor};
use std::io::Read;
use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};

fn dispatcher(world: World, config: RunConfig) -> Dispatcher<Vec<String>> {
    let supervisor = Supervisor::new(AgentPrograms::new("unused-hunter", "unused-prey"));
    Dispatcher::new(world, supervisor, Vec::new(), config)
}

fn quiet() -> RunConfig {
    RunConfig {
        render_initial: false,
        ..RunConfig::default()
    }
}

async fn attach(d: &mut Dispatcher<Vec<String>>, unit: UnitId) -> UnixStream {
    let (channel, agent) = AgentChannel::pair().unwrap();
    d.attach(unit, channel).await.unwrap();
    agent
}

fn read_view(agent: &mut UnixStream) -> WorldView {
    let mut buf = [0u8; WORLD_VIEW_LEN];
    agent.read_exact(&mut buf).unwrap();
    WorldView::decode(&buf).unwrap()
}

fn spawn_agent(role: Role, size: MapSize, agent: UnixStream) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = AgentRuntime::new(role, size).with_think_delay(ThinkDelay::none());
        let output = agent.try_clone().unwrap();
        // The coordinator may hang up mid-turn once this unit is dead.
        let _ = runtime.run(agent, output);
    })
}

fn at(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

#[tokio::test]
async fn lone_hunter_chases_still_prey_down() {
    let world: World = "3 3\n0\n1\n0 0 5\n1\n2 2 5\n".parse().unwrap();
    let size = world.size();
    let mut d = dispatcher(world, quiet());

    let hunter = spawn_agent(Role::Hunter, size, attach(&mut d, UnitId(0)).await);
    let mut prey = attach(&mut d, UnitId(1)).await;
    assert_eq!(read_view(&mut prey).adversary, at(0, 0));

    let outcome = d.run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Stable {
            winner: Some(Role::Hunter)
        }
    );

    let h = d.world().unit(UnitId(0));
    assert_eq!(h.position, at(2, 2));
    assert_eq!(h.energy, 5 - 3 - 1 + 5);
    assert_eq!(
        d.deaths(),
        &[Death {
            unit: UnitId(1),
            cause: DeathCause::Eaten { by: UnitId(0) }
        }]
    );

    let report = d.report(outcome);
    assert_eq!(report.cycles, 4);
    assert_eq!(report.requests, 4);
    assert_eq!(report.renders, 4);
    assert_eq!(d.sink().last().unwrap(), "+---+\n|   |\n|   |\n|  H|\n+---+\n");

    d.shutdown().await;
    hunter.join().unwrap();
}

#[tokio::test]
async fn chase_between_real_agent_loops_ends_with_one_death() {
    let world: World = "3 3\n0\n1\n0 0 5\n1\n2 2 5\n".parse().unwrap();
    let size = world.size();
    let mut d = dispatcher(world, quiet());

    let hunter = spawn_agent(Role::Hunter, size, attach(&mut d, UnitId(0)).await);
    let prey = spawn_agent(Role::Prey, size, attach(&mut d, UnitId(1)).await);

    let outcome = d.run().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Stable { winner: Some(_) }));
    assert_eq!(d.deaths().len(), 1);
    assert_eq!(d.world().live_units().count(), 1);

    d.shutdown().await;
    hunter.join().unwrap();
    prey.join().unwrap();
}

#[tokio::test]
async fn corridor_with_obstacle_leaves_both_standing() {
    let world: World = "3 1\n1\n1 0\n1\n0 0 5\n1\n2 0 5\n".parse().unwrap();
    let size = world.size();
    let mut d = dispatcher(world, quiet());

    let mut hunter = attach(&mut d, UnitId(0)).await;
    let mut prey = attach(&mut d, UnitId(1)).await;

    let hunter_view = read_view(&mut hunter);
    let prey_view = read_view(&mut prey);
    assert_eq!(hunter_view.objects(), &[at(1, 0)]);
    assert_eq!(prey_view.objects(), &[at(1, 0)]);

    let hunter_move = AgentRuntime::new(Role::Hunter, size).turn(&hunter_view);
    let prey_move = AgentRuntime::new(Role::Prey, size).turn(&prey_view);
    assert_eq!(hunter_move.destination, at(0, 0));
    assert_eq!(prey_move.destination, at(2, 0));
    hunter_move.write_to(&mut hunter).unwrap();
    prey_move.write_to(&mut prey).unwrap();

    let summary = d.run_cycle().await.unwrap();
    assert_eq!(summary.requests, 2);
    assert!(!summary.world_changed);
    assert!(!summary.rendered);
    assert!(d.sink().is_empty());

    // Both are answered even though nothing moved.
    assert_eq!(read_view(&mut hunter), hunter_view);
    assert_eq!(read_view(&mut prey), prey_view);

    d.shutdown().await;
}

#[tokio::test]
async fn second_hunter_sees_the_first_ones_kill() {
    let world: World = "3 1\n0\n2\n0 0 5\n2 0 5\n1\n1 0 3\n".parse().unwrap();
    let mut d = dispatcher(world, quiet());

    let mut first = attach(&mut d, UnitId(0)).await;
    let mut second = attach(&mut d, UnitId(1)).await;
    let mut prey = attach(&mut d, UnitId(2)).await;
    for agent in [&mut first, &mut second, &mut prey] {
        read_view(agent);
    }

    MoveRequest::new(at(1, 0)).write_to(&mut first).unwrap();
    MoveRequest::new(at(1, 0)).write_to(&mut second).unwrap();

    let summary = d.run_cycle().await.unwrap();
    assert_eq!(summary.requests, 2);
    assert_eq!(
        summary.deaths,
        vec![Death {
            unit: UnitId(2),
            cause: DeathCause::Eaten { by: UnitId(0) }
        }]
    );
    assert!(summary.rendered);
    assert_eq!(d.sink().len(), 1);

    let w = d.world();
    assert_eq!(w.unit(UnitId(0)).position, at(1, 0));
    assert_eq!(w.unit(UnitId(0)).energy, 5 - 1 + 3);
    assert_eq!(w.unit(UnitId(1)).position, at(2, 0));
    assert_eq!(w.unit(UnitId(1)).energy, 5);
    assert!(w.is_stable());

    // The winner now has its ally as a blocked neighbor, and no prey to chase.
    let view = read_view(&mut first);
    assert_eq!(view.position, at(1, 0));
    assert_eq!(view.adversary, at(1, 0));
    assert_eq!(view.objects(), &[at(2, 0)]);

    // The loser was refused and told so with an unchanged position.
    let view = read_view(&mut second);
    assert_eq!(view.position, at(2, 0));
    assert_eq!(view.objects(), &[at(1, 0)]);

    // The eaten prey's channel is closed.
    assert!(!d.is_connected(UnitId(2)));
    let mut rest = Vec::new();
    assert_eq!(prey.read_to_end(&mut rest).unwrap(), 0);

    d.shutdown().await;
}

#[tokio::test]
async fn exhausted_hunter_dies_where_it_stepped() {
    let world: World = "3 3\n0\n1\n0 0 1\n1\n2 2 5\n".parse().unwrap();
    let mut d = dispatcher(world, quiet());

    let mut hunter = attach(&mut d, UnitId(0)).await;
    let _prey = attach(&mut d, UnitId(1)).await;
    read_view(&mut hunter);

    MoveRequest::new(at(1, 0)).write_to(&mut hunter).unwrap();
    let summary = d.run_cycle().await.unwrap();

    assert_eq!(
        summary.deaths,
        vec![Death {
            unit: UnitId(0),
            cause: DeathCause::Exhausted
        }]
    );
    assert!(summary.rendered);
    let h = d.world().unit(UnitId(0));
    assert_eq!(h.position, at(1, 0));
    assert_eq!(h.energy, 0);
    assert_eq!(d.sink()[0], "+---+\n|   |\n|   |\n|  P|\n+---+\n");

    // No view follows a fatal move.
    let mut rest = Vec::new();
    assert_eq!(hunter.read_to_end(&mut rest).unwrap(), 0);

    d.shutdown().await;
}

#[tokio::test]
async fn crashed_agent_is_marked_dead_and_the_run_continues() {
    let world: World = "4 1\n0\n1\n0 0 5\n2\n2 0 5\n3 0 5\n".parse().unwrap();
    let mut d = dispatcher(world, quiet());

    let mut hunter = attach(&mut d, UnitId(0)).await;
    let crashed = attach(&mut d, UnitId(1)).await;
    let _other = attach(&mut d, UnitId(2)).await;
    read_view(&mut hunter);
    drop(crashed);

    let summary = d.run_cycle().await.unwrap();
    assert_eq!(summary.requests, 0);
    assert_eq!(
        summary.deaths,
        vec![Death {
            unit: UnitId(1),
            cause: DeathCause::Disconnected
        }]
    );
    assert!(summary.rendered);
    assert!(!d.world().is_alive(UnitId(1)));
    assert!(!d.is_connected(UnitId(1)));
    assert!(!d.world().is_stable());
    assert_eq!(d.sink()[0], "+----+\n|H  P|\n+----+\n");

    // The remaining agents are still served.
    MoveRequest::new(at(1, 0)).write_to(&mut hunter).unwrap();
    let summary = d.run_cycle().await.unwrap();
    assert_eq!(summary.requests, 1);
    assert_eq!(read_view(&mut hunter).adversary, at(3, 0));

    d.shutdown().await;
}

#[tokio::test]
async fn agent_gone_before_its_first_view_is_buried_on_attach() {
    let world: World = "3 1\n0\n1\n0 0 5\n1\n2 0 5\n".parse().unwrap();
    let mut d = dispatcher(world, quiet());

    let (channel, agent) = AgentChannel::pair().unwrap();
    drop(agent);
    assert!(!d.attach(UnitId(0), channel).await.unwrap());
    let _prey = attach(&mut d, UnitId(1)).await;

    assert!(!d.world().is_alive(UnitId(0)));
    assert!(!d.is_connected(UnitId(0)));
    assert!(d.is_connected(UnitId(1)));
    assert_eq!(
        d.deaths(),
        &[Death {
            unit: UnitId(0),
            cause: DeathCause::Disconnected
        }]
    );
    assert!(d.world().is_stable());

    d.shutdown().await;
}

/// Play `rounds` of scripted moves against `world`, every request of a round
/// written before the cycle that serves it.
async fn play(world: &str, rounds: &[&[(usize, (i32, i32))]]) -> (World, Vec<Death>) {
    let world: World = world.parse().unwrap();
    let ids: Vec<UnitId> = world.ids().collect();
    let mut d = dispatcher(world, quiet());

    let mut agents = Vec::new();
    for unit in ids {
        agents.push(attach(&mut d, unit).await);
    }
    for round in rounds {
        for &(unit, (x, y)) in *round {
            MoveRequest::new(at(x, y)).write_to(&mut agents[unit]).unwrap();
        }
        let summary = d.run_cycle().await.unwrap();
        assert_eq!(summary.requests, round.len());
    }

    let result = (d.world().clone(), d.deaths().to_vec());
    d.shutdown().await;
    result
}

#[tokio::test]
async fn same_roster_and_moves_give_the_same_world() {
    let world = "4 2\n0\n2\n0 0 3\n3 1 1\n2\n1 0 2\n2 1 4\n";
    let rounds: &[&[(usize, (i32, i32))]] = &[
        &[(0, (0, 1)), (1, (3, 0)), (2, (2, 0)), (3, (1, 1))],
        &[(0, (1, 1)), (2, (2, 1))],
    ];

    let first = play(world, rounds).await;
    let second = play(world, rounds).await;
    assert_eq!(first, second);

    let (world, deaths) = first;
    assert_eq!(
        deaths,
        vec![
            Death {
                unit: UnitId(1),
                cause: DeathCause::Exhausted
            },
            Death {
                unit: UnitId(3),
                cause: DeathCause::Eaten { by: UnitId(0) }
            },
        ]
    );
    let h = world.unit(UnitId(0));
    assert_eq!(h.position, at(1, 1));
    assert_eq!(h.energy, 3 - 1 - 1 + 4);
    assert_eq!(world.unit(UnitId(2)).position, at(2, 1));
}

#[tokio::test]
async fn cycle_limit_stops_a_stalemate() {
    let world: World = "3 1\n1\n1 0\n1\n0 0 5\n1\n2 0 5\n".parse().unwrap();
    let size = world.size();
    let mut d = dispatcher(world, quiet().with_max_cycles(3));

    let hunter = spawn_agent(Role::Hunter, size, attach(&mut d, UnitId(0)).await);
    let prey = spawn_agent(Role::Prey, size, attach(&mut d, UnitId(1)).await);

    let outcome = d.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::CycleLimit);
    assert_eq!(d.cycles(), 3);
    assert!(d.deaths().is_empty());
    assert!(d.sink().is_empty());

    let report = d.report(outcome);
    assert_eq!(report.survivors.len(), 2);

    d.shutdown().await;
    hunter.join().unwrap();
    prey.join().unwrap();
}

#[tokio::test]
async fn stable_world_needs_no_cycles() {
    let world: World = "2 1\n0\n1\n0 0 5\n0\n".parse().unwrap();
    let mut d = dispatcher(world, RunConfig::default());

    d.render().unwrap();
    let outcome = d.run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Stable {
            winner: Some(Role::Hunter)
        }
    );
    assert_eq!(d.sink().as_slice(), &["+--+\n|H |\n+--+\n".to_string()]);
    assert_eq!(d.report(outcome).renders, 1);
}

#[tokio::test]
async fn shutdown_closes_every_agent_channel() {
    let world: World = "2 1\n0\n1\n0 0 5\n1\n1 0 5\n".parse().unwrap();
    let mut d = dispatcher(world, quiet());
    let mut hunter = attach(&mut d, UnitId(0)).await;
    let mut prey = attach(&mut d, UnitId(1)).await;

    d.shutdown().await;
    d.shutdown().await;

    for agent in [&mut hunter, &mut prey] {
        read_view(agent);
        let mut rest = Vec::new();
        assert_eq!(agent.read_to_end(&mut rest).unwrap(), 0);
    }
}
