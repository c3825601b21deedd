//! Tuning surface for the node-capture world.

use std::time::Duration;

use crate::PLAYER_PRODUCTION_MULTIPLIER;

/// Default seed used when callers do not provide one.
pub const DEFAULT_SEED: u64 = 0x6861_636b_696e_6721;

/// Which connections a side is allowed to sever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutPolicy {
    /// A side may only cut connections it owns.
    OwnConnections,
    /// A side may cut any connection, including the opponent's.
    AnyConnection,
}

/// Parameters of procedural level generation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Smallest number of nodes a level requests.
    pub min_nodes: usize,
    /// Largest number of nodes a level requests.
    pub max_nodes: usize,
    /// Margin kept free along every edge of the bounds.
    pub padding: f32,
    /// Minimum centre-to-centre distance between two nodes.
    pub min_distance: f32,
    /// Placement attempts per node before it is skipped.
    pub placement_attempts: u32,
    /// Value every generated node starts with.
    pub initial_value: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_nodes: 5,
            max_nodes: 10,
            padding: 100.0,
            min_distance: 150.0,
            placement_attempts: 100,
            initial_value: 10.0,
        }
    }
}

/// Configuration parameters required to construct the world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Seed of the world's random source (layout and overflow forwarding).
    pub rng_seed: u64,
    /// Production multiplier applied to player-owned nodes.
    pub player_production_multiplier: f32,
    /// Which connections each side may cut.
    pub cut_policy: CutPolicy,
    /// Upper bound applied to every tick's delta time.
    pub max_frame_dt: Duration,
    /// Simulated time between the end of the game and the freeze; `None` never freezes.
    pub freeze_delay: Option<Duration>,
    /// Procedural level generation parameters.
    pub layout: LayoutConfig,
}

impl WorldConfig {
    /// Default configuration with an explicit seed.
    #[must_use]
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rng_seed: DEFAULT_SEED,
            player_production_multiplier: PLAYER_PRODUCTION_MULTIPLIER,
            cut_policy: CutPolicy::OwnConnections,
            max_frame_dt: Duration::from_millis(100),
            freeze_delay: Some(Duration::from_secs(5)),
            layout: LayoutConfig::default(),
        }
    }
}
