use std::time::Duration;

use minigames_core::{ArrivalOutcome, Command, ConnectionRemoval, Event, NodeId, Owner, Vec2};
use minigames_world::{self as world, query, World, WorldConfig};

const FRAME: Duration = Duration::from_millis(100);

fn scenario(nodes: &[(f32, f32, Owner, f32)]) -> World {
    let mut world = World::with_config(WorldConfig {
        freeze_delay: None,
        ..WorldConfig::default()
    });
    let mut events = Vec::new();
    for &(x, y, owner, value) in nodes {
        world::apply(
            &mut world,
            Command::PlaceNode {
                position: Vec2::new(x, y),
                owner,
                value,
            },
            &mut events,
        );
    }
    world
}

fn connect(world: &mut World, from: u32, to: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::CreateConnection {
            from: NodeId::new(from),
            to: NodeId::new(to),
        },
        &mut events,
    );
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);
    events
}

fn run_until(
    world: &mut World,
    max_ticks: usize,
    mut predicate: impl FnMut(&Event) -> bool,
) -> Option<Event> {
    for _ in 0..max_ticks {
        if let Some(found) = tick(world).into_iter().find(|event| predicate(event)) {
            return Some(found);
        }
    }
    None
}

#[test]
fn friendly_arrival_reinforces_target() {
    let mut world = scenario(&[
        (100.0, 100.0, Owner::Player, 40.0),
        (300.0, 100.0, Owner::Player, 10.0),
        (100.0, 500.0, Owner::Enemy, 10.0),
    ]);
    let _ = connect(&mut world, 0, 1);

    let arrival = run_until(&mut world, 100, |event| {
        matches!(event, Event::UnitArrived { target, .. } if *target == NodeId::new(1))
    });

    match arrival {
        Some(Event::UnitArrived { outcome, .. }) => {
            assert_eq!(outcome, ArrivalOutcome::Reinforced);
        }
        other => panic!("expected an arrival at the friendly node, got {other:?}"),
    }
}

#[test]
fn full_target_without_exits_keeps_its_value() {
    let mut world = scenario(&[
        (100.0, 100.0, Owner::Player, 40.0),
        (300.0, 100.0, Owner::Player, 60.0),
        (100.0, 500.0, Owner::Enemy, 10.0),
    ]);
    let _ = connect(&mut world, 0, 1);

    let arrival = run_until(&mut world, 100, |event| {
        matches!(event, Event::UnitArrived { .. })
    });

    assert!(matches!(
        arrival,
        Some(Event::UnitArrived {
            outcome: ArrivalOutcome::Wasted,
            ..
        })
    ));
    let target = query::node(&world, NodeId::new(1)).expect("target exists");
    assert_eq!(target.value, 60.0);
}

#[test]
fn hostile_arrivals_capture_the_node() {
    let mut world = scenario(&[
        (100.0, 100.0, Owner::Player, 40.0),
        (250.0, 100.0, Owner::Enemy, 1.0),
    ]);
    let _ = connect(&mut world, 0, 1);

    let capture = run_until(&mut world, 600, |event| {
        matches!(event, Event::NodeCaptured { .. })
    });

    assert_eq!(
        capture,
        Some(Event::NodeCaptured {
            node: NodeId::new(1),
            previous: Owner::Enemy,
            owner: Owner::Player,
        })
    );
    let captured = query::node(&world, NodeId::new(1)).expect("captured node exists");
    assert_eq!(captured.owner, Owner::Player);
    assert!(captured.value >= 0.0 && captured.value <= 1.0);
}

#[test]
fn captured_node_loses_its_outgoing_connections_once() {
    let mut world = scenario(&[
        (100.0, 100.0, Owner::Player, 40.0),
        (250.0, 100.0, Owner::Enemy, 1.0),
        (250.0, 400.0, Owner::Neutral, 10.0),
    ]);
    assert!(matches!(
        connect(&mut world, 1, 2).as_slice(),
        [Event::ConnectionCreated { .. }]
    ));
    let _ = connect(&mut world, 0, 1);

    let mut removals = 0;
    let mut captured = false;
    for _ in 0..600 {
        for event in tick(&mut world) {
            match event {
                Event::NodeCaptured { node, .. } if node == NodeId::new(1) => captured = true,
                Event::ConnectionRemoved {
                    from,
                    to,
                    reason: ConnectionRemoval::OwnerChanged,
                } => {
                    assert_eq!((from, to), (NodeId::new(1), NodeId::new(2)));
                    removals += 1;
                }
                _ => {}
            }
        }

        let nodes = query::nodes(&world);
        for connection in query::connections(&world).iter() {
            let source = nodes.get(connection.from).expect("source exists");
            assert_eq!(connection.owner, source.owner);
        }
    }

    assert!(captured, "the enemy node was never captured");
    assert_eq!(removals, 1);
    let connections = query::connections(&world);
    assert!(!connections.contains(NodeId::new(1), NodeId::new(2)));
}

#[test]
fn scoreboard_counts_units_in_flight() {
    let mut world = scenario(&[
        (100.0, 100.0, Owner::Player, 40.0),
        (900.0, 100.0, Owner::Neutral, 10.0),
        (100.0, 500.0, Owner::Enemy, 10.0),
    ]);
    let _ = connect(&mut world, 0, 1);
    let spawned = run_until(&mut world, 100, |event| {
        matches!(event, Event::UnitSpawned { .. })
    });
    assert!(spawned.is_some());

    let nodes = query::nodes(&world);
    let units = query::units(&world);
    let in_flight = units
        .iter()
        .filter(|unit| unit.owner == Owner::Player)
        .count() as u32;
    let expected_player = nodes
        .iter()
        .filter(|node| node.owner == Owner::Player)
        .map(|node| node.value.floor() as u32)
        .sum::<u32>()
        + in_flight;

    assert_eq!(units.len(), 1);
    assert_eq!(query::scoreboard(&world).player(), expected_player);
    let enemy_value = nodes
        .get(NodeId::new(2))
        .map(|node| node.value.floor() as u32)
        .expect("enemy node exists");
    assert_eq!(query::scoreboard(&world).enemy(), enemy_value);
}
