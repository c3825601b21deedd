#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the node-capture game.
//!
//! The world owns an arena of nodes indexed by [`NodeId`], the connections
//! between them and the units in flight. Every mutation flows through
//! [`apply`], which reports what happened as [`Event`] values. Read access for
//! renderers and systems goes through the [`query`] module.

mod config;
mod connection;
mod geometry;
mod level;
mod node;
mod unit;

use std::time::Duration;

use minigames_core::{
    ArrivalOutcome, Bounds, Command, ConnectionRejection, ConnectionRemoval, Event, GameStatus,
    NodeId, NodeLevel, Owner, Scoreboard, UnitId, Vec2,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

pub use config::{CutPolicy, LayoutConfig, WorldConfig, DEFAULT_SEED};

use connection::Connection;
use node::Node;
use unit::{Travel, Unit};

/// Maximum value a node can store.
pub const NODE_CAPACITY: f32 = 60.0;

/// Hit-test radius of every node.
pub const NODE_RADIUS: f32 = 30.0;

/// Seconds a connection needs to grow to full length.
pub const GROWTH_DURATION: f32 = 0.5;

/// Distance a unit travels per second.
pub const UNIT_SPEED: f32 = 100.0;

/// Remaining distance below which a unit counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 5.0;

/// Balancing lever: player-owned nodes produce 10% faster.
pub const PLAYER_PRODUCTION_MULTIPLIER: f32 = 1.1;

/// Represents the authoritative node-capture world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    units: Vec<Unit>,
    next_unit_id: u32,
    scoreboard: Option<Scoreboard>,
    status: GameStatus,
    since_end: Duration,
    tick_index: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world using the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            nodes: Vec::new(),
            connections: Vec::new(),
            units: Vec::new(),
            next_unit_id: 0,
            scoreboard: None,
            status: GameStatus::Running,
            since_end: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn node_index(&self, id: NodeId) -> Option<usize> {
        let index = usize::try_from(id.get()).ok()?;
        (index < self.nodes.len()).then_some(index)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    fn connection_index(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.connections
            .iter()
            .position(|connection| connection.from == from && connection.to == to)
    }

    fn outgoing_count(&self, from: NodeId) -> usize {
        self.connections
            .iter()
            .filter(|connection| connection.from == from)
            .count()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.units.clear();
        self.next_unit_id = 0;
        self.scoreboard = None;
        self.status = GameStatus::Running;
        self.since_end = Duration::ZERO;
    }

    fn generate_level(&mut self, bounds: Bounds, out_events: &mut Vec<Event>) {
        self.reset();

        let layout = level::scatter(&mut self.rng, bounds, &self.config.layout);
        for &index in &layout.failed {
            warn!(
                index,
                attempts = self.config.layout.placement_attempts,
                "failed to place node, skipping it"
            );
            out_events.push(Event::NodePlacementFailed { index });
        }

        let initial_value = self.config.layout.initial_value;
        for (placed, position) in layout.positions.into_iter().enumerate() {
            let owner = match placed {
                0 => Owner::Player,
                1 => Owner::Enemy,
                _ => Owner::Neutral,
            };
            self.place_node(position, owner, initial_value, out_events);
        }

        info!(
            requested = layout.requested,
            placed = self.nodes.len(),
            width = bounds.width(),
            height = bounds.height(),
            "level generated"
        );
        out_events.push(Event::LevelGenerated {
            requested: layout.requested,
            placed: self.nodes.len(),
        });
    }

    fn place_node(
        &mut self,
        position: Vec2,
        owner: Owner,
        value: f32,
        out_events: &mut Vec<Event>,
    ) {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node::new(id, position, owner, value));
        out_events.push(Event::NodePlaced { node: id, owner });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.status.is_frozen() {
            return;
        }

        let dt = dt.min(self.config.max_frame_dt);
        let seconds = dt.as_secs_f32();
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        let levels_before = self.levels();

        let player_multiplier = self.config.player_production_multiplier;
        for node in &mut self.nodes {
            let multiplier = match node.owner {
                Owner::Player => player_multiplier,
                Owner::Enemy | Owner::Neutral => 1.0,
            };
            node.update(seconds, multiplier);
        }

        self.prune_stale_connections(out_events);
        self.update_connections(seconds, out_events);
        self.update_units(seconds, out_events);
        self.prune_units();
        self.prune_stale_connections(out_events);
        self.report_level_changes(&levels_before, out_events);

        self.advance_post_game(dt, out_events);
        self.refresh_score(out_events);
    }

    fn update_connections(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        let mut transfers = Vec::new();
        for connection in &mut self.connections {
            let Some(source) = node_mut(&mut self.nodes, connection.from) else {
                continue;
            };
            if connection.update(seconds, source) {
                transfers.push((
                    source.position,
                    source.owner,
                    connection.from,
                    connection.to,
                ));
            }
        }

        for (position, owner, source, target) in transfers {
            self.spawn_unit(position, owner, source, target, out_events);
        }
    }

    fn update_units(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        // Units spawned by forwarding during this pass start moving next tick.
        let count = self.units.len();
        for index in 0..count {
            let target = self.units[index].target;
            let Some(target_position) = self.node(target).map(|node| node.position) else {
                let _ = self.units[index].deactivate();
                continue;
            };

            match self.units[index].advance(seconds, target_position) {
                Travel::Arrived => self.resolve_arrival(index, out_events),
                Travel::Moving | Travel::Idle => {}
            }
        }
    }

    fn spawn_unit(
        &mut self,
        position: Vec2,
        owner: Owner,
        source: NodeId,
        target: NodeId,
        out_events: &mut Vec<Event>,
    ) {
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.wrapping_add(1);
        let unit = Unit::new(id, position, owner, source, target);
        self.units.push(unit);
        out_events.push(Event::UnitSpawned {
            unit: id,
            source,
            target,
            owner,
        });
    }

    /// Applies the arrival effect of the unit at `index` exactly once.
    fn resolve_arrival(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.get_mut(index) else {
            return;
        };
        if !unit.deactivate() {
            return;
        }
        let (unit_id, owner, target) = (unit.id, unit.owner, unit.target);
        let Some(target_index) = self.node_index(target) else {
            return;
        };

        let mut forward = None;
        let node = &mut self.nodes[target_index];
        let outcome = if node.owner == owner {
            if node.reinforce() {
                ArrivalOutcome::Reinforced
            } else {
                let position = node.position;
                let destinations: Vec<NodeId> = self
                    .connections
                    .iter()
                    .filter(|connection| connection.from == target)
                    .map(|connection| connection.to)
                    .collect();
                match destinations.choose(&mut self.rng).copied() {
                    Some(to) => {
                        forward = Some((position, to));
                        ArrivalOutcome::Forwarded { to }
                    }
                    None => ArrivalOutcome::Wasted,
                }
            }
        } else {
            match node.absorb_hit(owner) {
                Some(previous) => {
                    info!(node = target.get(), ?previous, ?owner, "node captured");
                    out_events.push(Event::NodeCaptured {
                        node: target,
                        previous,
                        owner,
                    });
                    ArrivalOutcome::Captured
                }
                None => ArrivalOutcome::Damaged,
            }
        };

        trace!(unit = unit_id.get(), node = target.get(), ?outcome, "unit arrived");
        out_events.push(Event::UnitArrived {
            unit: unit_id,
            target,
            outcome,
        });

        if let Some((position, to)) = forward {
            self.spawn_unit(position, owner, target, to, out_events);
        }
    }

    fn prune_units(&mut self) {
        self.units.retain(|unit| unit.active);
    }

    /// Drops every connection whose source no longer belongs to its owner.
    fn prune_stale_connections(&mut self, out_events: &mut Vec<Event>) {
        let nodes = &self.nodes;
        self.connections.retain(|connection| {
            let source_owner = usize::try_from(connection.from.get())
                .ok()
                .and_then(|index| nodes.get(index))
                .map(|node| node.owner);
            let keep = !connection.owner.is_neutral() && source_owner == Some(connection.owner);
            if !keep {
                out_events.push(Event::ConnectionRemoved {
                    from: connection.from,
                    to: connection.to,
                    reason: ConnectionRemoval::OwnerChanged,
                });
            }
            keep
        });
    }

    fn validate_connection(
        &self,
        from: NodeId,
        to: NodeId,
    ) -> Result<(usize, usize), ConnectionRejection> {
        if self.status.is_frozen() {
            return Err(ConnectionRejection::Frozen);
        }
        let source = self
            .node_index(from)
            .ok_or(ConnectionRejection::UnknownNode)?;
        let target = self.node_index(to).ok_or(ConnectionRejection::UnknownNode)?;
        if from == to {
            return Err(ConnectionRejection::SelfLoop);
        }
        if self.connection_index(from, to).is_some() {
            return Err(ConnectionRejection::Duplicate);
        }
        if self.nodes[source].owner.is_neutral() {
            return Err(ConnectionRejection::NeutralSource);
        }
        if self.outgoing_count(from) >= self.nodes[source].max_connections() {
            return Err(ConnectionRejection::LimitReached);
        }
        Ok((source, target))
    }

    fn create_connection(&mut self, from: NodeId, to: NodeId, out_events: &mut Vec<Event>) {
        let (source, target) = match self.validate_connection(from, to) {
            Ok(indices) => indices,
            Err(reason) => {
                debug!(from = from.get(), to = to.get(), ?reason, "connection rejected");
                out_events.push(Event::ConnectionRejected { from, to, reason });
                return;
            }
        };

        if let Some(reverse) = self.connection_index(to, from) {
            if self.nodes[source].owner == self.nodes[target].owner {
                let removed = self.connections.remove(reverse);
                out_events.push(Event::ConnectionRemoved {
                    from: removed.from,
                    to: removed.to,
                    reason: ConnectionRemoval::Rerouted,
                });
            }
        }

        let connection = Connection::new(&self.nodes[source], &self.nodes[target]);
        out_events.push(Event::ConnectionCreated {
            from,
            to,
            owner: connection.owner,
        });
        self.connections.push(connection);
    }

    fn cut(&mut self, start: Vec2, end: Vec2, actor: Owner, out_events: &mut Vec<Event>) {
        if self.status.is_frozen() {
            return;
        }

        let policy = self.config.cut_policy;
        let severed: Vec<(NodeId, NodeId)> = self
            .connections
            .iter()
            .filter(|connection| may_cut(policy, actor, connection.owner))
            .filter(|connection| {
                geometry::segments_intersect(start, end, connection.start(), connection.end())
            })
            .map(|connection| (connection.from, connection.to))
            .collect();
        if severed.is_empty() {
            return;
        }

        let levels_before = self.levels();
        for (from, to) in severed {
            let in_flight: Vec<usize> = self
                .units
                .iter()
                .enumerate()
                .filter(|(_, unit)| unit.active && unit.source == from && unit.target == to)
                .map(|(index, _)| index)
                .collect();
            for index in in_flight {
                self.resolve_arrival(index, out_events);
            }

            if let Some(index) = self.connection_index(from, to) {
                let _ = self.connections.remove(index);
                out_events.push(Event::ConnectionRemoved {
                    from,
                    to,
                    reason: ConnectionRemoval::Cut,
                });
            }
        }

        self.prune_units();
        self.prune_stale_connections(out_events);
        self.report_level_changes(&levels_before, out_events);
        self.refresh_score(out_events);
    }

    fn levels(&self) -> Vec<NodeLevel> {
        self.nodes.iter().map(Node::level).collect()
    }

    /// Emits `NodeLevelChanged` for every node whose level differs from `before`.
    fn report_level_changes(&self, before: &[NodeLevel], out_events: &mut Vec<Event>) {
        for (node, &before) in self.nodes.iter().zip(before) {
            let level = node.level();
            if level != before {
                out_events.push(Event::NodeLevelChanged {
                    node: node.id,
                    level,
                });
            }
        }
    }

    fn compute_score(&self) -> Scoreboard {
        let mut score = Scoreboard::default();
        for node in &self.nodes {
            score.add(node.owner, node.value.max(0.0).floor() as u32);
        }
        for unit in self.units.iter().filter(|unit| unit.active) {
            score.add(unit.owner, 1);
        }
        score
    }

    /// Publishes score changes and detects the terminal condition.
    fn refresh_score(&mut self, out_events: &mut Vec<Event>) {
        let score = self.compute_score();
        if self.scoreboard != Some(score) {
            self.scoreboard = Some(score);
            out_events.push(Event::ScoreChanged { score });
        }

        if self.status != GameStatus::Running || self.nodes.is_empty() {
            return;
        }

        let winner = if score.enemy() == 0 {
            Some(Owner::Player)
        } else if score.player() == 0 {
            Some(Owner::Enemy)
        } else {
            None
        };

        if let Some(winner) = winner {
            info!(?winner, tick = self.tick_index, "game ended");
            self.status = GameStatus::Ended { winner };
            self.since_end = Duration::ZERO;
            out_events.push(Event::GameEnded { winner });
        }
    }

    fn advance_post_game(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let GameStatus::Ended { winner } = self.status else {
            return;
        };
        let Some(delay) = self.config.freeze_delay else {
            return;
        };

        self.since_end = self.since_end.saturating_add(dt);
        if self.since_end >= delay {
            self.status = GameStatus::Frozen { winner };
            out_events.push(Event::SimulationFrozen);
        }
    }
}

fn node_mut(nodes: &mut [Node], id: NodeId) -> Option<&mut Node> {
    usize::try_from(id.get())
        .ok()
        .and_then(move |index| nodes.get_mut(index))
}

fn may_cut(policy: CutPolicy, actor: Owner, owner: Owner) -> bool {
    match (policy, actor) {
        (_, Owner::Neutral) => false,
        (CutPolicy::OwnConnections, Owner::Player | Owner::Enemy) => actor == owner,
        (CutPolicy::AnyConnection, Owner::Player | Owner::Enemy) => true,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateLevel { bounds } => world.generate_level(bounds, out_events),
        Command::PlaceNode {
            position,
            owner,
            value,
        } => world.place_node(position, owner, value, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::CreateConnection { from, to } => world.create_connection(from, to, out_events),
        Command::Cut { start, end, actor } => world.cut(start, end, actor, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use minigames_core::{
        ConnectionView, GameStatus, NodeId, NodeSnapshot, NodeView, Scoreboard, UnitView, Vec2,
    };

    use super::{World, WorldConfig};

    /// Captures a read-only view of every node, including its outgoing count.
    #[must_use]
    pub fn nodes(world: &World) -> NodeView {
        NodeView::from_snapshots(
            world
                .nodes
                .iter()
                .map(|node| node.snapshot(world.outgoing_count(node.id)))
                .collect(),
        )
    }

    /// Captures a single node.
    #[must_use]
    pub fn node(world: &World, id: NodeId) -> Option<NodeSnapshot> {
        world
            .node(id)
            .map(|node| node.snapshot(world.outgoing_count(id)))
    }

    /// First node, in id order, whose hit area contains the point.
    #[must_use]
    pub fn node_at(world: &World, point: Vec2) -> Option<NodeId> {
        world
            .nodes
            .iter()
            .find(|node| node.contains(point))
            .map(|node| node.id)
    }

    /// Captures a read-only view of the connections in creation order.
    #[must_use]
    pub fn connections(world: &World) -> ConnectionView {
        ConnectionView::from_snapshots(
            world
                .connections
                .iter()
                .map(|connection| {
                    let contested = world
                        .connection_index(connection.to, connection.from)
                        .is_some();
                    connection.snapshot(contested)
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the units still in flight.
    #[must_use]
    pub fn units(world: &World) -> UnitView {
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .filter(|unit| unit.active)
                .map(|unit| unit.snapshot())
                .collect(),
        )
    }

    /// Number of outgoing connections held by the node.
    #[must_use]
    pub fn outgoing_count(world: &World, id: NodeId) -> usize {
        world.outgoing_count(id)
    }

    /// Current score per side.
    #[must_use]
    pub fn scoreboard(world: &World) -> Scoreboard {
        world.compute_score()
    }

    /// Current lifecycle state of the level.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(nodes: &[(f32, f32, Owner, f32)]) -> (World, Vec<Event>) {
        let mut world = World::with_config(WorldConfig {
            freeze_delay: None,
            ..WorldConfig::default()
        });
        let mut events = Vec::new();
        for &(x, y, owner, value) in nodes {
            apply(
                &mut world,
                Command::PlaceNode {
                    position: Vec2::new(x, y),
                    owner,
                    value,
                },
                &mut events,
            );
        }
        (world, events)
    }

    #[test]
    fn placed_nodes_receive_sequential_ids() {
        let (world, events) = world_with(&[
            (0.0, 0.0, Owner::Player, 10.0),
            (100.0, 0.0, Owner::Enemy, 10.0),
        ]);
        assert_eq!(
            events,
            vec![
                Event::NodePlaced {
                    node: NodeId::new(0),
                    owner: Owner::Player
                },
                Event::NodePlaced {
                    node: NodeId::new(1),
                    owner: Owner::Enemy
                },
            ]
        );
        assert_eq!(query::nodes(&world).len(), 2);
    }

    #[test]
    fn tick_clamps_large_steps() {
        let (mut world, _) = world_with(&[
            (0.0, 0.0, Owner::Player, 10.0),
            (100.0, 0.0, Owner::Enemy, 10.0),
        ]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );
        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(100)
            })
        );
    }

    #[test]
    fn may_cut_follows_policy() {
        let own = CutPolicy::OwnConnections;
        let any = CutPolicy::AnyConnection;
        assert!(may_cut(own, Owner::Player, Owner::Player));
        assert!(!may_cut(own, Owner::Player, Owner::Enemy));
        assert!(may_cut(any, Owner::Player, Owner::Enemy));
        assert!(!may_cut(any, Owner::Neutral, Owner::Enemy));
    }

    #[test]
    fn full_friendly_target_forwards_along_an_exit() {
        let (mut world, _) = world_with(&[
            (0.0, 0.0, Owner::Player, 10.0),
            (200.0, 0.0, Owner::Player, NODE_CAPACITY),
            (400.0, 0.0, Owner::Neutral, 10.0),
            (0.0, 400.0, Owner::Enemy, 10.0),
        ]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CreateConnection {
                from: NodeId::new(1),
                to: NodeId::new(2),
            },
            &mut events,
        );
        world.spawn_unit(
            Vec2::new(197.0, 0.0),
            Owner::Player,
            NodeId::new(0),
            NodeId::new(1),
            &mut events,
        );
        events.clear();

        world.resolve_arrival(0, &mut events);
        assert_eq!(
            events,
            vec![
                Event::UnitArrived {
                    unit: UnitId::new(0),
                    target: NodeId::new(1),
                    outcome: ArrivalOutcome::Forwarded { to: NodeId::new(2) },
                },
                Event::UnitSpawned {
                    unit: UnitId::new(1),
                    source: NodeId::new(1),
                    target: NodeId::new(2),
                    owner: Owner::Player,
                },
            ]
        );
        assert_eq!(world.nodes[1].value, NODE_CAPACITY);
        assert_eq!(world.units[1].position, Vec2::new(200.0, 0.0));

        world.resolve_arrival(0, &mut events);
        assert_eq!(events.len(), 2, "a unit resolves at most once");
    }

    #[test]
    fn full_friendly_target_without_exits_wastes_the_packet() {
        let (mut world, _) = world_with(&[
            (0.0, 0.0, Owner::Player, 10.0),
            (200.0, 0.0, Owner::Player, NODE_CAPACITY),
        ]);
        let mut events = Vec::new();
        world.spawn_unit(
            Vec2::new(200.0, 0.0),
            Owner::Player,
            NodeId::new(0),
            NodeId::new(1),
            &mut events,
        );
        events.clear();

        world.resolve_arrival(0, &mut events);
        assert_eq!(
            events,
            vec![Event::UnitArrived {
                unit: UnitId::new(0),
                target: NodeId::new(1),
                outcome: ArrivalOutcome::Wasted,
            }]
        );
        world.prune_units();
        assert!(query::units(&world).is_empty());
    }

    #[test]
    fn node_at_uses_hit_radius() {
        let (world, _) = world_with(&[(200.0, 200.0, Owner::Player, 10.0)]);
        assert_eq!(
            query::node_at(&world, Vec2::new(220.0, 200.0)),
            Some(NodeId::new(0))
        );
        assert_eq!(query::node_at(&world, Vec2::new(240.0, 200.0)), None);
    }
}
