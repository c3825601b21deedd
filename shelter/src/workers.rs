//! Dwellers, robots and the FIFO job queue they work through.

use std::collections::VecDeque;

use minigames_core::{CellCoord, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    grid::TileGrid,
    pathfinding::find_path,
    rooms::{RoomKind, WorkerStats},
    ShelterEvent,
};

/// Maximum number of robots a shelter can field.
pub const MAX_ROBOTS: usize = 4;

/// Fixed movement speed of robots in tiles per second.
pub const ROBOT_SPEED: f32 = 4.0;

/// Seconds a job takes at work speed 1.
pub const WORK_DURATION: f32 = 1.0;

/// Unique identifier of a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Creates a new identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value backing the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Flavour of worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerKind {
    /// Human dweller; speed follows the room buffs.
    Dweller,
    /// Robot helper with a fixed speed.
    Robot,
}

/// What a job asks the worker to do at its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Excavate dirt or rock.
    Dig,
    /// Furnish an excavated tile with a room.
    Build(RoomKind),
}

/// Unit of work waiting in the queue or carried by a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    /// What to do.
    pub kind: JobKind,
    /// Where to do it.
    pub cell: CellCoord,
}

impl Job {
    /// Creates a dig job.
    #[must_use]
    pub const fn dig(cell: CellCoord) -> Self {
        Self {
            kind: JobKind::Dig,
            cell,
        }
    }

    /// Creates a room construction job.
    #[must_use]
    pub const fn build(kind: RoomKind, cell: CellCoord) -> Self {
        Self {
            kind: JobKind::Build(kind),
            cell,
        }
    }
}

/// A single dweller or robot.
#[derive(Clone, Debug)]
pub struct Worker {
    id: WorkerId,
    kind: WorkerKind,
    position: Vec2,
    speed: f32,
    path: VecDeque<CellCoord>,
    job: Option<Job>,
    work_elapsed: f32,
}

impl Worker {
    fn new(id: WorkerId, kind: WorkerKind, cell: CellCoord, speed: f32) -> Self {
        Self {
            id,
            kind,
            position: cell_centre(cell),
            speed,
            path: VecDeque::new(),
            job: None,
            work_elapsed: 0.0,
        }
    }

    /// Identifier of the worker.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Dweller or robot.
    #[must_use]
    pub const fn kind(&self) -> WorkerKind {
        self.kind
    }

    /// Position in tile units; integral values sit on a cell.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Cell the worker currently stands on.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        CellCoord::new(
            self.position.x.round().max(0.0) as u32,
            self.position.y.round().max(0.0) as u32,
        )
    }

    /// Movement speed in tiles per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Job the worker is carrying out.
    #[must_use]
    pub const fn job(&self) -> Option<Job> {
        self.job
    }

    /// Reports whether the worker waits for a job.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.job.is_none()
    }
}

/// Every worker of the shelter plus the jobs waiting for them.
#[derive(Clone, Debug, Default)]
pub struct Workforce {
    workers: Vec<Worker>,
    jobs: VecDeque<Job>,
    next_id: u32,
    stats: WorkerStats,
}

impl Workforce {
    /// Creates an empty workforce with base stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Workers in spawn order.
    #[must_use]
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Jobs waiting for a worker, front first.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Number of dwellers.
    #[must_use]
    pub fn dweller_count(&self) -> usize {
        self.count(WorkerKind::Dweller)
    }

    /// Number of robots.
    #[must_use]
    pub fn robot_count(&self) -> usize {
        self.count(WorkerKind::Robot)
    }

    fn count(&self, kind: WorkerKind) -> usize {
        self.workers
            .iter()
            .filter(|worker| worker.kind == kind)
            .count()
    }

    /// Stats applied to dwellers.
    #[must_use]
    pub const fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// Adds a dweller at the cell using the current dweller speed.
    pub fn spawn_dweller(&mut self, cell: CellCoord) -> WorkerId {
        let speed = self.stats.speed;
        self.spawn(WorkerKind::Dweller, cell, speed)
    }

    /// Adds a dweller at an exact position with a stored speed.
    pub fn restore_dweller(&mut self, position: Vec2, speed: f32) -> WorkerId {
        let id = self.spawn(WorkerKind::Dweller, CellCoord::new(0, 0), speed);
        if let Some(worker) = self.workers.last_mut() {
            worker.position = position;
        }
        id
    }

    /// Adds a robot at the cell unless the robot cap is reached.
    pub fn spawn_robot(&mut self, cell: CellCoord) -> Option<WorkerId> {
        if self.robot_count() >= MAX_ROBOTS {
            return None;
        }
        Some(self.spawn(WorkerKind::Robot, cell, ROBOT_SPEED))
    }

    fn spawn(&mut self, kind: WorkerKind, cell: CellCoord, speed: f32) -> WorkerId {
        let id = WorkerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.workers.push(Worker::new(id, kind, cell, speed));
        id
    }

    /// Replaces the stats and re-applies the speed to every dweller.
    pub fn set_stats(&mut self, stats: WorkerStats) {
        self.stats = stats;
        for worker in &mut self.workers {
            if worker.kind == WorkerKind::Dweller {
                worker.speed = stats.speed;
            }
        }
    }

    /// Appends a job to the back of the queue.
    pub fn enqueue(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// Removes every worker and every queued job.
    pub fn clear(&mut self) {
        self.workers.clear();
        self.jobs.clear();
    }

    /// Advances every worker by `dt` seconds.
    ///
    /// Idle workers take the front job and plan a path to it; unreachable
    /// jobs go to the back of the queue. Workers walk their path and, once on
    /// the job cell, work until the job applies to the grid.
    pub fn update(&mut self, dt: f32, grid: &mut TileGrid, out: &mut Vec<ShelterEvent>) {
        let work_speed = self.stats.work_speed;
        for worker in &mut self.workers {
            if worker.job.is_none() {
                if let Some(job) = self.jobs.pop_front() {
                    match find_path(grid, worker.cell(), job.cell) {
                        Some(path) => {
                            worker.path = path.into();
                            worker.job = Some(job);
                            worker.work_elapsed = 0.0;
                            out.push(ShelterEvent::JobStarted {
                                worker: worker.id,
                                job,
                            });
                        }
                        None => {
                            debug!(
                                column = job.cell.column(),
                                row = job.cell.row(),
                                "job unreachable, requeued"
                            );
                            self.jobs.push_back(job);
                            out.push(ShelterEvent::JobRequeued { job });
                        }
                    }
                }
            }

            if let Some(next) = worker.path.front().copied() {
                let target = cell_centre(next);
                let delta = target - worker.position;
                let distance = delta.length();
                let step = worker.speed * dt;
                if distance <= step {
                    worker.position = target;
                    let _ = worker.path.pop_front();
                } else {
                    worker.position += delta / distance * step;
                }
            } else if let Some(job) = worker.job {
                worker.work_elapsed += dt * work_speed;
                if worker.work_elapsed >= WORK_DURATION {
                    let applied = match job.kind {
                        JobKind::Dig => grid.dig(job.cell),
                        JobKind::Build(_) => grid.build_room(job.cell),
                    };
                    worker.job = None;
                    worker.work_elapsed = 0.0;
                    out.push(ShelterEvent::JobCompleted {
                        worker: worker.id,
                        job,
                        applied,
                    });
                }
            }
        }
    }
}

fn cell_centre(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}
