#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy opponent that periodically extends connections from the nodes it owns.

use std::time::Duration;

use minigames_core::{Command, ConnectionView, Event, NodeId, NodeSnapshot, NodeView, Owner};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Simulated time between two decisions when callers use the stock pacing.
pub const DEFAULT_DECISION_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration parameters required to construct the opponent system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    side: Owner,
    decision_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration for the side the opponent plays, its pacing and seed.
    #[must_use]
    pub const fn new(side: Owner, decision_interval: Duration, rng_seed: u64) -> Self {
        Self {
            side,
            decision_interval,
            rng_seed,
        }
    }

    /// Side the opponent plays.
    #[must_use]
    pub const fn side(&self) -> Owner {
        self.side
    }
}

/// Pure system that answers elapsed time with `CreateConnection` commands.
#[derive(Debug)]
pub struct Opponent {
    side: Owner,
    decision_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    halted: bool,
}

impl Opponent {
    /// Creates a new opponent using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            side: config.side,
            decision_interval: config.decision_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            halted: false,
        }
    }

    /// Side the opponent plays.
    #[must_use]
    pub fn side(&self) -> Owner {
        self.side
    }

    /// Consumes world events and read-only views to emit connection requests.
    ///
    /// At most one decision is taken per call, once the accumulated simulated
    /// time reaches the decision interval. The opponent stays quiet after the
    /// game ended until a new level is generated.
    pub fn handle(
        &mut self,
        events: &[Event],
        nodes: &NodeView,
        connections: &ConnectionView,
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::LevelGenerated { .. } => {
                    self.accumulator = Duration::ZERO;
                    self.halted = false;
                    accumulated = Duration::ZERO;
                }
                Event::GameEnded { .. } => self.halted = true,
                _ => {}
            }
        }

        if self.halted || self.side.is_neutral() {
            self.accumulator = Duration::ZERO;
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if accumulated.is_zero() || self.accumulator < self.decision_interval {
            return;
        }

        self.accumulator = Duration::ZERO;
        self.decide(nodes, connections, out);
    }

    fn decide(&mut self, nodes: &NodeView, connections: &ConnectionView, out: &mut Vec<Command>) {
        let side = self.side;
        let opponent = side.opponent();
        let mut issued = 0;

        for node in nodes.iter().filter(|node| node.owner == side) {
            if node.outgoing >= node.max_connections() {
                continue;
            }

            let linked: Vec<NodeId> = connections
                .outgoing(node.id)
                .map(|connection| connection.to)
                .collect();
            let candidates: Vec<&NodeSnapshot> = nodes
                .iter()
                .filter(|candidate| candidate.id != node.id && !linked.contains(&candidate.id))
                .collect();

            let Some(to) = self.pick_target(node, &candidates, opponent) else {
                continue;
            };
            debug!(?side, from = node.id.get(), to = to.get(), "opponent extends a connection");
            out.push(Command::CreateConnection { from: node.id, to });
            issued += 1;
        }

        debug!(?side, issued, "opponent decision");
    }

    /// Neutral nodes first; otherwise a rival node holding strictly less value.
    fn pick_target(
        &mut self,
        node: &NodeSnapshot,
        candidates: &[&NodeSnapshot],
        opponent: Option<Owner>,
    ) -> Option<NodeId> {
        let neutral: Vec<NodeId> = candidates
            .iter()
            .filter(|candidate| candidate.owner.is_neutral())
            .map(|candidate| candidate.id)
            .collect();
        if let Some(&target) = neutral.choose(&mut self.rng) {
            return Some(target);
        }

        let weaker: Vec<NodeId> = candidates
            .iter()
            .filter(|candidate| Some(candidate.owner) == opponent && candidate.value < node.value)
            .map(|candidate| candidate.id)
            .collect();
        weaker.choose(&mut self.rng).copied()
    }
}
