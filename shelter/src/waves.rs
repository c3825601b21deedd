//! Hostile waves assaulting the shelter entrance.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::ShelterEvent;

/// Delay between two hostile spawns.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(1_500);

/// Hit points of every hostile.
pub const HOSTILE_HEALTH: f32 = 50.0;

/// Marching speed of hostiles in tiles per second.
pub const HOSTILE_SPEED: f32 = 2.8125;

/// Damage per second the shelter deals without armories.
pub const BASE_DEFENSE_DPS: f32 = 10.0;

/// Additional damage per second per armory.
pub const ARMORY_DEFENSE_DPS: f32 = 10.0;

const SPAWN_OFFSET: f32 = 1.5;

/// Kinds of hostiles, in the order they join the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Joins from day 1.
    Radroach,
    /// Joins from day 2.
    MoleRat,
    /// Joins from day 3.
    Ghoul,
    /// Joins from day 4.
    RaiderScum,
    /// Joins from day 5.
    RaiderPsycho,
    /// Joins from day 6.
    SuperMutant,
    /// Joins from day 7.
    Deathclaw,
}

impl EnemyKind {
    /// Every kind in roster order.
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Radroach,
        EnemyKind::MoleRat,
        EnemyKind::Ghoul,
        EnemyKind::RaiderScum,
        EnemyKind::RaiderPsycho,
        EnemyKind::SuperMutant,
        EnemyKind::Deathclaw,
    ];

    /// How many of this kind attack on `day`.
    #[must_use]
    pub const fn count_on(self, day: u32) -> u32 {
        let (first_day, base) = match self {
            EnemyKind::Radroach => (1, 5),
            EnemyKind::MoleRat => (2, 3),
            EnemyKind::Ghoul => (3, 3),
            EnemyKind::RaiderScum => (4, 2),
            EnemyKind::RaiderPsycho => (5, 2),
            EnemyKind::SuperMutant => (6, 1),
            EnemyKind::Deathclaw => return if day >= 7 { 1 } else { 0 },
        };
        if day >= first_day {
            base + day
        } else {
            0
        }
    }
}

/// Hostiles of a day's wave in roster order, before shuffling.
#[must_use]
pub fn wave_composition(day: u32) -> Vec<EnemyKind> {
    EnemyKind::ALL
        .iter()
        .flat_map(|&kind| std::iter::repeat(kind).take(kind.count_on(day) as usize))
        .collect()
}

/// Shuffled spawn order for a day's wave.
pub fn generate_wave<R: Rng>(day: u32, rng: &mut R) -> Vec<EnemyKind> {
    let mut wave = wave_composition(day);
    wave.shuffle(rng);
    wave
}

/// Hostile marching along the surface lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hostile {
    /// Kind of hostile.
    pub kind: EnemyKind,
    /// Distance from the shelter entrance in tiles.
    pub position: f32,
    /// Remaining hit points.
    pub health: f32,
}

/// Spawns a wave one hostile at a time and resolves the lane fight.
#[derive(Clone, Debug)]
pub struct WaveSpawner {
    day: u32,
    queue: Vec<EnemyKind>,
    timer: Duration,
    interval: Duration,
    lane_length: f32,
    hostiles: Vec<Hostile>,
    breaches: u32,
    active: bool,
}

impl WaveSpawner {
    /// Creates an idle spawner for a lane of `lane_length` tiles.
    #[must_use]
    pub const fn new(interval: Duration, lane_length: f32) -> Self {
        Self {
            day: 0,
            queue: Vec::new(),
            timer: Duration::ZERO,
            interval,
            lane_length,
            hostiles: Vec::new(),
            breaches: 0,
            active: false,
        }
    }

    /// Queues the wave for `day`. Returns the number of hostiles queued.
    pub fn start<R: Rng>(&mut self, day: u32, rng: &mut R) -> usize {
        self.day = day;
        self.queue = generate_wave(day, rng);
        self.timer = Duration::ZERO;
        self.hostiles.clear();
        self.breaches = 0;
        self.active = true;
        self.queue.len()
    }

    /// Drops any wave in progress and re-measures the lane.
    pub fn reset(&mut self, lane_length: f32) {
        self.lane_length = lane_length;
        self.queue.clear();
        self.hostiles.clear();
        self.timer = Duration::ZERO;
        self.breaches = 0;
        self.active = false;
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Day of the current or last wave.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Hostiles still waiting to spawn.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Hostiles on the lane.
    #[must_use]
    pub fn hostiles(&self) -> &[Hostile] {
        &self.hostiles
    }

    /// Steps spawning, marching and the defence.
    ///
    /// Returns the number of breaches once the wave is cleared.
    pub fn update(
        &mut self,
        dt: Duration,
        defense_dps: f32,
        out: &mut Vec<ShelterEvent>,
    ) -> Option<u32> {
        if !self.active {
            return None;
        }

        if !self.queue.is_empty() {
            self.timer = self.timer.saturating_add(dt);
            if self.timer >= self.interval {
                self.timer = Duration::ZERO;
                if let Some(kind) = self.queue.pop() {
                    self.hostiles.push(Hostile {
                        kind,
                        position: (self.lane_length - SPAWN_OFFSET).max(0.0),
                        health: HOSTILE_HEALTH,
                    });
                    out.push(ShelterEvent::HostileSpawned { kind });
                }
            }
        }

        let seconds = dt.as_secs_f32();
        for hostile in &mut self.hostiles {
            hostile.position -= HOSTILE_SPEED * seconds;
        }
        if let Some(leader) = self
            .hostiles
            .iter_mut()
            .min_by(|a, b| a.position.total_cmp(&b.position))
        {
            leader.health -= defense_dps * seconds;
        }

        let mut breached = 0;
        self.hostiles.retain(|hostile| {
            if hostile.health <= 0.0 {
                out.push(ShelterEvent::HostileDefeated { kind: hostile.kind });
                false
            } else if hostile.position <= 0.0 {
                out.push(ShelterEvent::HostileBreached { kind: hostile.kind });
                breached += 1;
                false
            } else {
                true
            }
        });
        self.breaches += breached;

        if self.queue.is_empty() && self.hostiles.is_empty() {
            self.active = false;
            return Some(self.breaches);
        }
        None
    }
}
