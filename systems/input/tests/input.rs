use minigames_core::{Command, Event, NodeId, NodeView, Owner, Vec2};
use minigames_system_input::{Gesture, Input};
use minigames_world::{self as world, query, World};

fn board() -> NodeView {
    let mut world = World::new();
    let mut events = Vec::new();
    let nodes = [
        (100.0, 100.0, Owner::Player),
        (400.0, 100.0, Owner::Neutral),
        (100.0, 400.0, Owner::Enemy),
    ];
    for (x, y, owner) in nodes {
        world::apply(
            &mut world,
            Command::PlaceNode {
                position: Vec2::new(x, y),
                owner,
                value: 10.0,
            },
            &mut events,
        );
    }
    query::nodes(&world)
}

#[test]
fn drag_between_nodes_requests_a_connection() {
    let nodes = board();
    let mut input = Input::new(Owner::Player);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(110.0, 95.0), &nodes);
    input.update_cursor(Vec2::new(250.0, 100.0));
    assert_eq!(
        input.gesture(),
        Gesture::Dragging {
            from: NodeId::new(0),
            origin: Vec2::new(100.0, 100.0),
            cursor: Vec2::new(250.0, 100.0),
        }
    );

    input.end_drag(Vec2::new(390.0, 110.0), &nodes, &mut commands);
    assert_eq!(
        commands,
        vec![Command::CreateConnection {
            from: NodeId::new(0),
            to: NodeId::new(1),
        }]
    );
    assert_eq!(input.gesture(), Gesture::Idle);
}

#[test]
fn drag_released_on_empty_space_or_origin_is_dropped() {
    let nodes = board();
    let mut input = Input::new(Owner::Player);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(100.0, 100.0), &nodes);
    input.end_drag(Vec2::new(700.0, 700.0), &nodes, &mut commands);
    input.pointer_down(Vec2::new(100.0, 100.0), &nodes);
    input.end_drag(Vec2::new(105.0, 100.0), &nodes, &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn pressing_a_foreign_node_starts_a_cut() {
    let nodes = board();
    let mut input = Input::new(Owner::Player);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(100.0, 400.0), &nodes);
    assert!(matches!(input.gesture(), Gesture::Cutting { .. }));

    input.end_drag(Vec2::new(300.0, 300.0), &nodes, &mut commands);
    assert_eq!(
        commands,
        vec![Command::Cut {
            start: Vec2::new(100.0, 400.0),
            end: Vec2::new(300.0, 300.0),
            actor: Owner::Player,
        }]
    );
}

#[test]
fn swipe_on_empty_space_cuts_with_the_local_side() {
    let nodes = board();
    let mut input = Input::new(Owner::Enemy);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(250.0, 50.0), &nodes);
    input.update_cursor(Vec2::new(250.0, 120.0));
    assert_eq!(
        input.gesture().preview(),
        Some((Vec2::new(250.0, 50.0), Vec2::new(250.0, 120.0)))
    );
    input.end_drag(Vec2::new(250.0, 150.0), &nodes, &mut commands);

    assert_eq!(
        commands,
        vec![Command::Cut {
            start: Vec2::new(250.0, 50.0),
            end: Vec2::new(250.0, 150.0),
            actor: Owner::Enemy,
        }]
    );
}

#[test]
fn tap_without_movement_is_not_a_cut() {
    let nodes = board();
    let mut input = Input::new(Owner::Player);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(250.0, 250.0), &nodes);
    input.end_drag(Vec2::new(250.0, 250.0), &nodes, &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn frozen_simulation_ignores_gestures_until_next_level() {
    let nodes = board();
    let mut input = Input::new(Owner::Player);
    let mut commands = Vec::new();

    input.pointer_down(Vec2::new(100.0, 100.0), &nodes);
    input.handle(&[Event::SimulationFrozen]);
    assert_eq!(input.gesture(), Gesture::Idle);

    input.pointer_down(Vec2::new(250.0, 250.0), &nodes);
    input.end_drag(Vec2::new(260.0, 260.0), &nodes, &mut commands);
    assert!(commands.is_empty());

    input.handle(&[Event::LevelGenerated {
        requested: 3,
        placed: 3,
    }]);
    input.pointer_down(Vec2::new(100.0, 100.0), &nodes);
    assert!(matches!(input.gesture(), Gesture::Dragging { .. }));
    input.cancel();
    assert_eq!(input.gesture(), Gesture::Idle);
}
