#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the minigames workspace.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative node-capture world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation layers to react to. Systems consume event
//! streams, query immutable views, and respond exclusively with new command
//! batches.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Hacking Wars.";

/// Value at or above which a node operates at level two.
pub const LEVEL_TWO_THRESHOLD: f32 = 15.0;

/// Value at or above which a node operates at level three.
pub const LEVEL_THREE_THRESHOLD: f32 = 30.0;

/// Side controlling a node or a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    /// The human-controlled side.
    Player,
    /// The computer-controlled side.
    Enemy,
    /// Nobody; neutral nodes never produce.
    Neutral,
}

impl Owner {
    /// Returns the competing side, or `None` for neutral.
    #[must_use]
    pub const fn opponent(self) -> Option<Owner> {
        match self {
            Self::Player => Some(Self::Enemy),
            Self::Enemy => Some(Self::Player),
            Self::Neutral => None,
        }
    }

    /// Reports whether the owner is neutral.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral)
    }
}

/// Discrete level a node operates at, derived purely from its stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLevel {
    /// Below [`LEVEL_TWO_THRESHOLD`].
    One,
    /// From [`LEVEL_TWO_THRESHOLD`] up to [`LEVEL_THREE_THRESHOLD`].
    Two,
    /// At or above [`LEVEL_THREE_THRESHOLD`].
    Three,
}

impl NodeLevel {
    /// Derives the level for the provided stored value.
    ///
    /// Downgrades are allowed: the level always follows the current value.
    #[must_use]
    pub fn from_value(value: f32) -> Self {
        if value >= LEVEL_THREE_THRESHOLD {
            Self::Three
        } else if value >= LEVEL_TWO_THRESHOLD {
            Self::Two
        } else {
            Self::One
        }
    }

    /// Numeric representation of the level (1, 2 or 3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Resource units produced per second at this level.
    #[must_use]
    pub const fn generation_rate(self) -> f32 {
        match self {
            Self::One => 1.1,
            Self::Two => 2.2,
            Self::Three => 3.3,
        }
    }

    /// Number of outgoing connections a node may hold at this level.
    #[must_use]
    pub const fn max_connections(self) -> usize {
        self.number() as usize
    }
}

/// Unique identifier assigned to a node. Doubles as its arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a travelling unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Playable area handed to level generation, measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates a new bounds descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent of the area.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the area.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards the current level and procedurally generates a new one.
    GenerateLevel {
        /// Area the nodes are scattered across.
        bounds: Bounds,
    },
    /// Appends a single node, used to author scripted scenarios.
    PlaceNode {
        /// Centre of the node in world units.
        position: Vec2,
        /// Side that controls the node.
        owner: Owner,
        /// Initial stored value.
        value: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a directed connection between two nodes.
    CreateConnection {
        /// Node that pays for the transfers.
        from: NodeId,
        /// Node that receives the units.
        to: NodeId,
    },
    /// Severs every permitted connection crossed by the provided segment.
    Cut {
        /// First point of the cut gesture.
        start: Vec2,
        /// Last point of the cut gesture.
        end: Vec2,
        /// Side performing the cut.
        actor: Owner,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick, after clamping.
        dt: Duration,
    },
    /// Announces that a fresh level replaced the previous one.
    LevelGenerated {
        /// Number of nodes the generator attempted to place.
        requested: usize,
        /// Number of nodes that were actually placed.
        placed: usize,
    },
    /// Reports that a node could not be placed and was skipped.
    NodePlacementFailed {
        /// Zero-based index of the skipped placement attempt.
        index: usize,
    },
    /// Confirms that a node was added to the world.
    NodePlaced {
        /// Identifier assigned to the node.
        node: NodeId,
        /// Side controlling the node.
        owner: Owner,
    },
    /// Reports that a node crossed a level threshold during a tick.
    NodeLevelChanged {
        /// Node whose level changed.
        node: NodeId,
        /// Level the node operates at now.
        level: NodeLevel,
    },
    /// Reports that hostile units drove a node to zero and flipped its owner.
    NodeCaptured {
        /// Node that changed hands.
        node: NodeId,
        /// Owner before the capture.
        previous: Owner,
        /// Owner after the capture.
        owner: Owner,
    },
    /// Confirms that a connection was created.
    ConnectionCreated {
        /// Source node.
        from: NodeId,
        /// Destination node.
        to: NodeId,
        /// Side the connection belongs to.
        owner: Owner,
    },
    /// Reports that a connection request was ignored.
    ConnectionRejected {
        /// Requested source node.
        from: NodeId,
        /// Requested destination node.
        to: NodeId,
        /// Specific reason the request failed.
        reason: ConnectionRejection,
    },
    /// Confirms that a connection left the world.
    ConnectionRemoved {
        /// Source node of the removed connection.
        from: NodeId,
        /// Destination node of the removed connection.
        to: NodeId,
        /// Why the connection was removed.
        reason: ConnectionRemoval,
    },
    /// Confirms that a unit started travelling.
    UnitSpawned {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Node the unit departed from.
        source: NodeId,
        /// Node the unit travels toward.
        target: NodeId,
        /// Side the unit belongs to.
        owner: Owner,
    },
    /// Reports that a unit reached its target and applied its effect.
    UnitArrived {
        /// Identifier of the arriving unit.
        unit: UnitId,
        /// Node the unit arrived at.
        target: NodeId,
        /// Effect the arrival had on the target.
        outcome: ArrivalOutcome,
    },
    /// Reports that at least one side's score changed.
    ScoreChanged {
        /// Scores after the tick.
        score: Scoreboard,
    },
    /// Announces the terminal state. Emitted exactly once per level.
    GameEnded {
        /// Side that won.
        winner: Owner,
    },
    /// Announces that the simulation stopped accepting ticks.
    SimulationFrozen,
}

/// Reasons a connection request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionRejection {
    /// One of the endpoints does not exist.
    UnknownNode,
    /// The source and destination are the same node.
    SelfLoop,
    /// The identical ordered pair already exists.
    Duplicate,
    /// Neutral nodes cannot originate connections.
    NeutralSource,
    /// The source already holds as many outgoing connections as its level allows.
    LimitReached,
    /// The simulation is frozen after the game ended.
    Frozen,
}

/// Reasons a connection may leave the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionRemoval {
    /// Severed by a cut gesture.
    Cut,
    /// The source node no longer belongs to the connection's owner.
    OwnerChanged,
    /// Replaced by a connection in the opposite direction between same-owner nodes.
    Rerouted,
}

/// Effect a unit had on the node it arrived at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// Added one unit of value to a friendly node.
    Reinforced,
    /// The friendly node was full; the packet continues toward another node.
    Forwarded {
        /// Node the forwarded packet travels toward.
        to: NodeId,
    },
    /// The friendly node was full and had nowhere to forward the packet.
    Wasted,
    /// Removed one unit of value from a hostile node.
    Damaged,
    /// Drove a hostile node to zero and took it over.
    Captured,
}

/// Running score per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreboard {
    player: u32,
    enemy: u32,
}

impl Scoreboard {
    /// Creates a scoreboard from explicit scores.
    #[must_use]
    pub const fn new(player: u32, enemy: u32) -> Self {
        Self { player, enemy }
    }

    /// Score of the player side.
    #[must_use]
    pub const fn player(&self) -> u32 {
        self.player
    }

    /// Score of the enemy side.
    #[must_use]
    pub const fn enemy(&self) -> u32 {
        self.enemy
    }

    /// Score of the provided side; neutral never scores.
    #[must_use]
    pub const fn score(&self, owner: Owner) -> u32 {
        match owner {
            Owner::Player => self.player,
            Owner::Enemy => self.enemy,
            Owner::Neutral => 0,
        }
    }

    /// Adds the provided amount to a side's score.
    pub fn add(&mut self, owner: Owner, amount: u32) {
        match owner {
            Owner::Player => self.player = self.player.saturating_add(amount),
            Owner::Enemy => self.enemy = self.enemy.saturating_add(amount),
            Owner::Neutral => {}
        }
    }
}

/// Lifecycle of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game is in progress.
    Running,
    /// A side won; the simulation keeps running so the final state can be observed.
    Ended {
        /// Side that won.
        winner: Owner,
    },
    /// The simulation stopped after the post-game delay.
    Frozen {
        /// Side that won.
        winner: Owner,
    },
}

impl GameStatus {
    /// Side that won, if the game is over.
    #[must_use]
    pub const fn winner(&self) -> Option<Owner> {
        match self {
            Self::Running => None,
            Self::Ended { winner } | Self::Frozen { winner } => Some(*winner),
        }
    }

    /// Reports whether the simulation stopped accepting ticks.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen { .. })
    }
}

/// Immutable representation of a single node's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Identifier of the node.
    pub id: NodeId,
    /// Centre of the node.
    pub position: Vec2,
    /// Hit-test radius.
    pub radius: f32,
    /// Side controlling the node.
    pub owner: Owner,
    /// Stored value.
    pub value: f32,
    /// Maximum storable value.
    pub capacity: f32,
    /// Level derived from the stored value.
    pub level: NodeLevel,
    /// Number of outgoing connections currently held.
    pub outgoing: usize,
}

impl NodeSnapshot {
    /// Circular hit test, inclusive at the radius.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }

    /// Number of outgoing connections the node may hold.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.level.max_connections()
    }
}

/// Read-only snapshot describing all nodes in the world.
#[derive(Clone, Debug, Default)]
pub struct NodeView {
    snapshots: Vec<NodeSnapshot>,
}

impl NodeView {
    /// Creates a new node view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<NodeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured node snapshots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// First node, in id order, whose hit area contains the point.
    #[must_use]
    pub fn node_at(&self, point: Vec2) -> Option<&NodeSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.contains(point))
    }

    /// Number of captured nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<NodeSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single connection's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionSnapshot {
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Side the connection belongs to, used for tinting.
    pub owner: Owner,
    /// Centre of the source node.
    pub start: Vec2,
    /// Centre of the destination node.
    pub end: Vec2,
    /// Growth progress in the range 0.0..=1.0.
    pub growth: f32,
    /// Currently visible cable length.
    pub length: f32,
    /// Straight-line distance between the endpoints.
    pub distance: f32,
    /// Direction of the cable in radians.
    pub angle: f32,
    /// Whether the reverse connection exists (tug of war).
    pub contested: bool,
}

impl ConnectionSnapshot {
    /// Reports whether the connection finished growing and may transfer.
    #[must_use]
    pub fn fully_grown(&self) -> bool {
        self.growth >= 1.0
    }
}

/// Read-only snapshot describing all connections, in creation order.
#[derive(Clone, Debug, Default)]
pub struct ConnectionView {
    snapshots: Vec<ConnectionSnapshot>,
}

impl ConnectionView {
    /// Creates a new connection view preserving the provided order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ConnectionSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured connections in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionSnapshot> {
        self.snapshots.iter()
    }

    /// Connections originating at the provided node.
    pub fn outgoing(&self, from: NodeId) -> impl Iterator<Item = &ConnectionSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.from == from)
    }

    /// Reports whether the ordered pair exists.
    #[must_use]
    pub fn contains(&self, from: NodeId, to: NodeId) -> bool {
        self.snapshots
            .iter()
            .any(|snapshot| snapshot.from == from && snapshot.to == to)
    }

    /// Number of captured connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ConnectionSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier of the unit.
    pub id: UnitId,
    /// Current position.
    pub position: Vec2,
    /// Side the unit belongs to.
    pub owner: Owner,
    /// Node the unit departed from.
    pub source: NodeId,
    /// Node the unit travels toward.
    pub target: NodeId,
}

/// Read-only snapshot describing all in-flight units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Applies a signed offset, returning `None` when a coordinate would go negative.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(Self::new(column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, ConnectionRejection, GameStatus, NodeId, NodeLevel, NodeSnapshot, NodeView,
        Owner, Scoreboard, Vec2,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    fn snapshot(id: u32, x: f32, owner: Owner) -> NodeSnapshot {
        NodeSnapshot {
            id: NodeId::new(id),
            position: Vec2::new(x, 0.0),
            radius: 30.0,
            owner,
            value: 10.0,
            capacity: 60.0,
            level: NodeLevel::One,
            outgoing: 0,
        }
    }

    #[test]
    fn level_follows_thresholds() {
        assert_eq!(NodeLevel::from_value(0.0), NodeLevel::One);
        assert_eq!(NodeLevel::from_value(14.9), NodeLevel::One);
        assert_eq!(NodeLevel::from_value(15.0), NodeLevel::Two);
        assert_eq!(NodeLevel::from_value(29.0), NodeLevel::Two);
        assert_eq!(NodeLevel::from_value(30.0), NodeLevel::Three);
        assert_eq!(NodeLevel::from_value(60.0).max_connections(), 3);
    }

    #[test]
    fn opponents_are_symmetric() {
        assert_eq!(Owner::Player.opponent(), Some(Owner::Enemy));
        assert_eq!(Owner::Enemy.opponent(), Some(Owner::Player));
        assert_eq!(Owner::Neutral.opponent(), None);
    }

    #[test]
    fn neutral_never_scores() {
        let mut score = Scoreboard::default();
        score.add(Owner::Neutral, 7);
        score.add(Owner::Enemy, 2);
        assert_eq!(score, Scoreboard::new(0, 2));
        assert_eq!(score.score(Owner::Neutral), 0);
    }

    #[test]
    fn status_reports_the_winner_once_decided() {
        assert_eq!(GameStatus::Running.winner(), None);
        let ended = GameStatus::Ended {
            winner: Owner::Enemy,
        };
        assert_eq!(ended.winner(), Some(Owner::Enemy));
        assert!(!ended.is_frozen());
        let frozen = GameStatus::Frozen {
            winner: Owner::Player,
        };
        assert_eq!(frozen.winner(), Some(Owner::Player));
        assert!(frozen.is_frozen());
    }

    #[test]
    fn node_view_hit_test_prefers_lowest_id() {
        let view = NodeView::from_snapshots(vec![
            snapshot(1, 10.0, Owner::Enemy),
            snapshot(0, 0.0, Owner::Player),
        ]);
        let hit = view.node_at(Vec2::new(5.0, 0.0)).expect("hit");
        assert_eq!(hit.id, NodeId::new(0));
        assert!(view.node_at(Vec2::new(100.0, 0.0)).is_none());
        assert_eq!(
            view.get(NodeId::new(1)).map(|node| node.owner),
            Some(Owner::Enemy)
        );
    }

    #[test]
    fn hit_test_is_inclusive_at_radius() {
        let node = snapshot(0, 0.0, Owner::Player);
        assert!(node.contains(Vec2::new(30.0, 0.0)));
        assert!(!node.contains(Vec2::new(30.5, 0.0)));
    }

    #[test]
    fn cell_offset_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 3);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(1, -1), Some(CellCoord::new(1, 2)));
        assert_eq!(origin.manhattan_distance(CellCoord::new(4, 0)), 7);
    }

    #[test]
    fn owner_round_trips_through_bincode() {
        assert_round_trip(&Owner::Neutral);
    }

    #[test]
    fn rejection_round_trips_through_bincode() {
        assert_round_trip(&ConnectionRejection::LimitReached);
    }

    #[test]
    fn scoreboard_round_trips_through_bincode() {
        assert_round_trip(&Scoreboard::new(12, 40));
    }
}
