use std::time::Duration;

use minigames_core::{
    ArrivalOutcome, Command, ConnectionRemoval, Event, NodeId, NodeLevel, Owner, Vec2,
};
use minigames_world::{self as world, query, CutPolicy, World, WorldConfig};

fn scenario(policy: CutPolicy) -> World {
    scenario_with_neutral_value(policy, 10.0)
}

fn scenario_with_neutral_value(policy: CutPolicy, neutral_value: f32) -> World {
    let mut world = World::with_config(WorldConfig {
        cut_policy: policy,
        ..WorldConfig::default()
    });
    let mut events = Vec::new();
    let nodes = [
        (100.0, 100.0, Owner::Player, 40.0),
        (400.0, 100.0, Owner::Neutral, neutral_value),
        (100.0, 400.0, Owner::Enemy, 10.0),
    ];
    for (x, y, owner, value) in nodes {
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
    world::apply(
        &mut world,
        Command::CreateConnection {
            from: NodeId::new(0),
            to: NodeId::new(1),
        },
        &mut events,
    );
    world
}

fn cut(world: &mut World, start: (f32, f32), end: (f32, f32), actor: Owner) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Cut {
            start: Vec2::new(start.0, start.1),
            end: Vec2::new(end.0, end.1),
            actor,
        },
        &mut events,
    );
    events
}

fn tick_until_first_unit(world: &mut World) {
    for _ in 0..100 {
        let mut events = Vec::new();
        world::apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        if events
            .iter()
            .any(|event| matches!(event, Event::UnitSpawned { .. }))
        {
            return;
        }
    }
    panic!("no unit spawned");
}

#[test]
fn cut_severs_connection_and_resolves_units_in_flight() {
    let mut world = scenario(CutPolicy::OwnConnections);
    tick_until_first_unit(&mut world);
    assert_eq!(query::units(&world).len(), 1);

    let events = cut(&mut world, (350.0, 50.0), (350.0, 150.0), Owner::Player);

    assert!(events.iter().any(|event| matches!(
        event,
        Event::UnitArrived {
            target,
            outcome: ArrivalOutcome::Damaged,
            ..
        } if *target == NodeId::new(1)
    )));
    assert!(events.contains(&Event::ConnectionRemoved {
        from: NodeId::new(0),
        to: NodeId::new(1),
        reason: ConnectionRemoval::Cut,
    }));
    assert!(query::connections(&world).is_empty());
    assert!(query::units(&world).is_empty());

    let target = query::node(&world, NodeId::new(1)).expect("target exists");
    assert_eq!(target.value, 9.0);
    assert_eq!(target.owner, Owner::Neutral);
}

#[test]
fn cut_that_misses_every_cable_changes_nothing() {
    let mut world = scenario(CutPolicy::OwnConnections);

    let beside = cut(&mut world, (150.0, 150.0), (350.0, 150.0), Owner::Player);
    assert!(beside.is_empty());
    let short = cut(&mut world, (400.0, 50.0), (400.0, 100.0), Owner::Player);
    assert!(short.is_empty());
    assert_eq!(query::connections(&world).len(), 1);
}

#[test]
fn own_connections_policy_protects_rival_cables() {
    let mut world = scenario(CutPolicy::OwnConnections);

    let events = cut(&mut world, (250.0, 50.0), (250.0, 150.0), Owner::Enemy);
    assert!(events.is_empty());
    assert_eq!(query::connections(&world).len(), 1);
}

#[test]
fn any_connection_policy_lets_rivals_cut() {
    let mut world = scenario(CutPolicy::AnyConnection);

    let events = cut(&mut world, (250.0, 50.0), (250.0, 150.0), Owner::Enemy);
    assert!(events.contains(&Event::ConnectionRemoved {
        from: NodeId::new(0),
        to: NodeId::new(1),
        reason: ConnectionRemoval::Cut,
    }));
    assert!(query::connections(&world).is_empty());
}

#[test]
fn forced_arrival_on_cut_reports_level_change() {
    let mut world = scenario_with_neutral_value(CutPolicy::OwnConnections, 15.0);
    tick_until_first_unit(&mut world);
    assert_eq!(
        query::node(&world, NodeId::new(1)).expect("target").level,
        NodeLevel::Two
    );

    let events = cut(&mut world, (350.0, 50.0), (350.0, 150.0), Owner::Player);
    assert!(events.contains(&Event::NodeLevelChanged {
        node: NodeId::new(1),
        level: NodeLevel::One,
    }));
    assert_eq!(
        query::node(&world, NodeId::new(1)).expect("target").value,
        14.0
    );
}
