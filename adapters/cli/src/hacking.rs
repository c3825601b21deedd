//! AI-versus-AI node-capture runner.

use std::{fmt, time::Duration};

use minigames_core::{Bounds, Command, Event, GameStatus, Owner, Scoreboard};
use minigames_system_ai::{Config, Opponent, DEFAULT_DECISION_INTERVAL};
use minigames_world::{self as world, query, CutPolicy, World, WorldConfig};
use tracing::{debug, info, trace};

/// Parameters of a headless match.
#[derive(Clone, Debug)]
pub(crate) struct HackingOptions {
    pub(crate) seed: u64,
    pub(crate) duration: Duration,
    pub(crate) dt: Duration,
    pub(crate) bounds: Bounds,
    pub(crate) cut_policy: CutPolicy,
}

/// Outcome of a headless match.
#[derive(Clone, Debug)]
pub(crate) struct MatchSummary {
    ticks: u64,
    score: Scoreboard,
    status: GameStatus,
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.status.winner() {
            Some(winner) => format!("{winner:?} wins"),
            None => "undecided".to_owned(),
        };
        write!(
            f,
            "{outcome} after {} ticks (player {}, enemy {})",
            self.ticks,
            self.score.player(),
            self.score.enemy()
        )
    }
}

/// Plays both sides with the greedy opponent until the world freezes or the
/// time runs out.
pub(crate) fn run(options: &HackingOptions) -> MatchSummary {
    let mut world = World::with_config(WorldConfig {
        cut_policy: options.cut_policy,
        ..WorldConfig::with_seed(options.seed)
    });
    let interval = DEFAULT_DECISION_INTERVAL;
    let mut opponents = [
        Opponent::new(Config::new(Owner::Player, interval, options.seed ^ 1)),
        Opponent::new(Config::new(Owner::Enemy, interval, options.seed ^ 2)),
    ];

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::GenerateLevel {
            bounds: options.bounds,
        },
        &mut events,
    );

    let frames = (options.duration.as_secs_f64() / options.dt.as_secs_f64()).ceil() as u64;
    for _ in 0..frames {
        world::apply(&mut world, Command::Tick { dt: options.dt }, &mut events);

        let nodes = query::nodes(&world);
        let connections = query::connections(&world);
        let mut commands = Vec::new();
        for opponent in &mut opponents {
            opponent.handle(&events, &nodes, &connections, &mut commands);
        }

        report(&events);
        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        if query::status(&world).is_frozen() {
            break;
        }
    }
    report(&events);

    MatchSummary {
        ticks: query::tick_index(&world),
        score: query::scoreboard(&world),
        status: query::status(&world),
    }
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::NodeCaptured {
                node,
                previous,
                owner,
            } => info!(node = node.get(), ?previous, ?owner, "node captured"),
            Event::GameEnded { winner } => info!(?winner, "match decided"),
            Event::SimulationFrozen => info!("simulation frozen"),
            Event::ConnectionCreated { from, to, owner } => {
                debug!(from = from.get(), to = to.get(), ?owner, "connection created");
            }
            Event::ConnectionRemoved { from, to, reason } => {
                debug!(from = from.get(), to = to.get(), ?reason, "connection removed");
            }
            Event::ScoreChanged { score } => {
                debug!(player = score.player(), enemy = score.enemy(), "score");
            }
            other => trace!(event = ?other),
        }
    }
}
