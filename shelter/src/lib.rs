#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Base-builder companion game: a shelter dug into a tile grid, worked by
//! dwellers and robots, and defended against a wave at the end of every day.
//!
//! [`Shelter`] aggregates the grid, the workforce, the built rooms, the day
//! clock and the wave spawner. Progress is driven by [`Shelter::update`],
//! which reports what happened as [`ShelterEvent`] values.

pub mod grid;
pub mod pathfinding;
pub mod rooms;
pub mod save;
pub mod time;
pub mod waves;
pub mod workers;

use std::time::Duration;

use minigames_core::{CellCoord, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{
    grid::{TileGrid, TileKind, GRID_COLUMNS, GRID_ROWS},
    rooms::{RoomKind, RoomLedger},
    save::{KeyValueStore, SaveData, SaveError, SavedWorker},
    time::{DayClock, DAY_LENGTH},
    waves::{EnemyKind, WaveSpawner, ARMORY_DEFENSE_DPS, BASE_DEFENSE_DPS, SPAWN_INTERVAL},
    workers::{Job, JobKind, WorkerId, WorkerKind, Workforce},
};

/// Default seed used when callers do not provide one.
pub const DEFAULT_SEED: u64 = 0x7368_656c_7465_7221;

/// Most dwellers a shelter can house.
pub const MAX_DWELLERS: usize = 10;

/// Day whose cleared wave completes the campaign.
pub const FINAL_DAY: u32 = 7;

/// Cell where new dwellers and robots arrive.
pub const ENTRY_CELL: CellCoord = CellCoord::new(2, 2);

/// Everything that can happen inside a shelter.
#[derive(Clone, Debug, PartialEq)]
pub enum ShelterEvent {
    /// A dweller or robot joined the shelter.
    WorkerSpawned {
        /// Identifier of the new worker.
        worker: WorkerId,
        /// Dweller or robot.
        kind: WorkerKind,
    },
    /// A job was appended to the queue.
    JobQueued {
        /// The job.
        job: Job,
    },
    /// A worker picked up a job and is walking to it.
    JobStarted {
        /// Worker carrying out the job.
        worker: WorkerId,
        /// The job.
        job: Job,
    },
    /// No path leads to the job; it went to the back of the queue.
    JobRequeued {
        /// The job.
        job: Job,
    },
    /// A worker finished a job.
    JobCompleted {
        /// Worker that carried out the job.
        worker: WorkerId,
        /// The job.
        job: Job,
        /// Whether the grid accepted the change.
        applied: bool,
    },
    /// A room was furnished and worker stats were recomputed.
    RoomBuilt {
        /// Kind of room.
        kind: RoomKind,
        /// Tile the room occupies.
        cell: CellCoord,
    },
    /// A new day dawned.
    DayStarted {
        /// The new day.
        day: u32,
    },
    /// The day's wave started.
    WarStarted {
        /// Day whose wave attacks.
        day: u32,
        /// Size of the wave.
        hostiles: usize,
    },
    /// A hostile entered the lane.
    HostileSpawned {
        /// Kind of hostile.
        kind: EnemyKind,
    },
    /// The defences destroyed a hostile.
    HostileDefeated {
        /// Kind of hostile.
        kind: EnemyKind,
    },
    /// A hostile reached the shelter entrance.
    HostileBreached {
        /// Kind of hostile.
        kind: EnemyKind,
    },
    /// Every hostile of the wave is gone.
    WaveCleared {
        /// Day of the wave.
        day: u32,
        /// Hostiles that reached the entrance.
        breaches: u32,
    },
    /// The final wave was cleared.
    CampaignWon,
}

/// Configuration parameters required to construct a shelter.
#[derive(Clone, Debug, PartialEq)]
pub struct ShelterConfig {
    /// Seed of the shelter's random source (rock layout and wave order).
    pub rng_seed: u64,
    /// Grid width in tiles.
    pub columns: u32,
    /// Grid height in tiles.
    pub rows: u32,
    /// Cells the starting dwellers occupy; they are excavated up front.
    pub initial_workers: Vec<CellCoord>,
    /// Simulated time before the day's wave attacks.
    pub day_length: Duration,
    /// Delay between hostile spawns.
    pub spawn_interval: Duration,
    /// Dweller count above which no newcomer arrives.
    pub max_dwellers: usize,
    /// Day whose cleared wave completes the campaign.
    pub final_day: u32,
}

impl ShelterConfig {
    /// Default configuration with an explicit seed.
    #[must_use]
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }
}

impl Default for ShelterConfig {
    fn default() -> Self {
        Self {
            rng_seed: DEFAULT_SEED,
            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            initial_workers: vec![ENTRY_CELL, CellCoord::new(3, 2)],
            day_length: DAY_LENGTH,
            spawn_interval: SPAWN_INTERVAL,
            max_dwellers: MAX_DWELLERS,
            final_day: FINAL_DAY,
        }
    }
}

/// A running shelter.
#[derive(Clone, Debug)]
pub struct Shelter {
    config: ShelterConfig,
    rng: ChaCha8Rng,
    grid: TileGrid,
    workforce: Workforce,
    rooms: RoomLedger,
    clock: DayClock,
    waves: WaveSpawner,
    won: bool,
}

impl Shelter {
    /// Generates a fresh site and moves the starting dwellers in.
    #[must_use]
    pub fn new(config: ShelterConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut grid = TileGrid::generate(config.columns, config.rows, &mut rng);
        let mut workforce = Workforce::new();
        for &cell in &config.initial_workers {
            let _ = grid.set(cell, TileKind::Empty);
            let _ = workforce.spawn_dweller(cell);
        }

        Self {
            rng,
            workforce,
            rooms: RoomLedger::default(),
            clock: DayClock::new(config.day_length),
            waves: WaveSpawner::new(config.spawn_interval, grid.columns() as f32),
            grid,
            won: false,
            config,
        }
    }

    /// Configuration the shelter was built with.
    #[must_use]
    pub const fn config(&self) -> &ShelterConfig {
        &self.config
    }

    /// Tile grid.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Workers and queued jobs.
    #[must_use]
    pub const fn workforce(&self) -> &Workforce {
        &self.workforce
    }

    /// Built rooms.
    #[must_use]
    pub const fn rooms(&self) -> &RoomLedger {
        &self.rooms
    }

    /// Day clock.
    #[must_use]
    pub const fn clock(&self) -> &DayClock {
        &self.clock
    }

    /// Wave in progress, if any.
    #[must_use]
    pub const fn waves(&self) -> &WaveSpawner {
        &self.waves
    }

    /// Reports whether the final wave has been cleared.
    #[must_use]
    pub const fn is_won(&self) -> bool {
        self.won
    }

    /// Damage per second dealt to the leading hostile.
    #[must_use]
    pub fn defense_dps(&self) -> f32 {
        BASE_DEFENSE_DPS + ARMORY_DEFENSE_DPS * self.rooms.count(RoomKind::Armory) as f32
    }

    /// Queues a dig job. Returns `false` when the tile cannot be dug or lies
    /// in a reserved row.
    pub fn order_dig(&mut self, cell: CellCoord, out: &mut Vec<ShelterEvent>) -> bool {
        let diggable = self.grid.tile(cell).is_some_and(TileKind::is_diggable);
        if self.grid.is_reserved(cell) || !diggable {
            return false;
        }
        self.queue(Job::dig(cell), out);
        true
    }

    /// Queues a room construction job. Returns `false` unless the tile is
    /// excavated and outside the reserved rows.
    pub fn order_room(
        &mut self,
        kind: RoomKind,
        cell: CellCoord,
        out: &mut Vec<ShelterEvent>,
    ) -> bool {
        if self.grid.is_reserved(cell) || self.grid.tile(cell) != Some(TileKind::Empty) {
            return false;
        }
        self.queue(Job::build(kind, cell), out);
        true
    }

    fn queue(&mut self, job: Job, out: &mut Vec<ShelterEvent>) {
        self.workforce.enqueue(job);
        out.push(ShelterEvent::JobQueued { job });
    }

    /// Builds a robot at the entry cell unless the robot cap is reached.
    pub fn spawn_robot(&mut self, out: &mut Vec<ShelterEvent>) -> Option<WorkerId> {
        let worker = self.workforce.spawn_robot(ENTRY_CELL)?;
        out.push(ShelterEvent::WorkerSpawned {
            worker,
            kind: WorkerKind::Robot,
        });
        Some(worker)
    }

    /// Sends the day's wave early. Returns `false` when already at war or won.
    pub fn start_war(&mut self, out: &mut Vec<ShelterEvent>) -> bool {
        if self.won || !self.clock.begin_war() {
            return false;
        }
        self.launch_wave(out);
        true
    }

    fn launch_wave(&mut self, out: &mut Vec<ShelterEvent>) {
        let day = self.clock.day();
        let hostiles = self.waves.start(day, &mut self.rng);
        info!(day, hostiles, "wave incoming");
        out.push(ShelterEvent::WarStarted { day, hostiles });
    }

    /// Advances the shelter by `dt` of simulated time.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<ShelterEvent>) {
        if self.won {
            return;
        }

        let first = out.len();
        self.workforce.update(dt.as_secs_f32(), &mut self.grid, out);
        let built: Vec<(RoomKind, CellCoord)> = out[first..]
            .iter()
            .filter_map(|event| match event {
                ShelterEvent::JobCompleted {
                    job:
                        Job {
                            kind: JobKind::Build(kind),
                            cell,
                        },
                    applied: true,
                    ..
                } => Some((*kind, *cell)),
                _ => None,
            })
            .collect();
        for (kind, cell) in built {
            let stats = self.rooms.add(kind, cell);
            self.workforce.set_stats(stats);
            out.push(ShelterEvent::RoomBuilt { kind, cell });
        }

        if self.clock.advance(dt) {
            self.launch_wave(out);
        }

        let defense = self.defense_dps();
        if let Some(breaches) = self.waves.update(dt, defense, out) {
            self.finish_wave(breaches, out);
        }
    }

    fn finish_wave(&mut self, breaches: u32, out: &mut Vec<ShelterEvent>) {
        let day = self.clock.day();
        info!(day, breaches, "wave cleared");
        out.push(ShelterEvent::WaveCleared { day, breaches });

        if day >= self.config.final_day {
            self.won = true;
            info!(day, "campaign won");
            out.push(ShelterEvent::CampaignWon);
            return;
        }

        let day = self.clock.finish_war();
        out.push(ShelterEvent::DayStarted { day });
        if self.workforce.dweller_count() < self.config.max_dwellers {
            let worker = self.workforce.spawn_dweller(ENTRY_CELL);
            out.push(ShelterEvent::WorkerSpawned {
                worker,
                kind: WorkerKind::Dweller,
            });
        }
    }

    /// Captures the persistent state: day, dwellers and tiles.
    #[must_use]
    pub fn snapshot(&self) -> SaveData {
        SaveData {
            day: self.clock.day(),
            workers: self
                .workforce
                .workers()
                .iter()
                .filter(|worker| worker.kind() == WorkerKind::Dweller)
                .map(|worker| SavedWorker {
                    x: worker.position().x,
                    y: worker.position().y,
                    speed: worker.speed(),
                })
                .collect(),
            tiles: self.grid.matrix(),
        }
    }

    /// Replaces the shelter state with a snapshot.
    ///
    /// Queued jobs, robots, rooms and any wave in progress are dropped.
    pub fn restore(&mut self, data: &SaveData) -> Result<(), SaveError> {
        let grid = TileGrid::from_matrix(&data.tiles).ok_or(SaveError::InvalidGrid)?;

        self.workforce.clear();
        self.rooms.clear();
        self.workforce.set_stats(self.rooms.stats());
        for worker in &data.workers {
            let _ = self
                .workforce
                .restore_dweller(Vec2::new(worker.x, worker.y), worker.speed);
        }
        self.waves.reset(grid.columns() as f32);
        self.grid = grid;
        self.clock.restore(data.day);
        self.won = false;
        Ok(())
    }

    /// Writes the shelter to `slot` and to the auto slot.
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        slot: &str,
    ) -> Result<(), SaveError> {
        save::save(store, slot, &self.snapshot())
    }

    /// Restores `slot`. Returns `false` when there is no usable save.
    pub fn load<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        slot: &str,
    ) -> Result<bool, SaveError> {
        match save::load(store, slot)? {
            Some(data) => {
                self.restore(&data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
