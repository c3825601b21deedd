//! Scripted shelter runner with optional save slots on disk.

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use minigames_core::CellCoord;
use minigames_shelter::{
    rooms::RoomKind,
    save::{FileStore, AUTO_SLOT},
    workers::{Job, JobKind},
    Shelter, ShelterConfig, ShelterEvent,
};
use tracing::{debug, info, trace, warn};

/// Simulated time budgeted for one day and its wave.
const DAY_BUDGET: Duration = Duration::from_secs(300);

const DIGS_PER_DAY: u32 = 4;
const TUNNEL_ROW: u32 = 3;
const ROOM_PLAN: [RoomKind; 3] = [RoomKind::Armory, RoomKind::WaterTreatment, RoomKind::Medbay];

/// Parameters of a shelter run.
#[derive(Clone, Debug)]
pub(crate) struct ShelterOptions {
    pub(crate) seed: u64,
    pub(crate) days: u32,
    pub(crate) dt: Duration,
    pub(crate) save_dir: Option<PathBuf>,
    pub(crate) slot: String,
    pub(crate) resume: bool,
}

/// State of the shelter when the run stopped.
#[derive(Clone, Debug)]
pub(crate) struct ShelterSummary {
    day: u32,
    dwellers: usize,
    robots: usize,
    rooms: usize,
    breaches: u32,
    won: bool,
}

impl fmt::Display for ShelterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {}: {} dwellers, {} robots, {} rooms, {} breaches",
            self.day, self.dwellers, self.robots, self.rooms, self.breaches
        )?;
        if self.won {
            write!(f, ", campaign won")?;
        }
        Ok(())
    }
}

/// Digs a tunnel eastwards below the entry and furnishes every third tile.
#[derive(Clone, Debug, Default)]
struct Foreman {
    next_column: u32,
    dug: usize,
}

impl Foreman {
    fn plan_day(&mut self, shelter: &mut Shelter, out: &mut Vec<ShelterEvent>) {
        let columns = shelter.grid().columns();
        let mut ordered = 0;
        while ordered < DIGS_PER_DAY && self.next_column < columns {
            let cell = CellCoord::new(self.next_column.max(2), TUNNEL_ROW);
            self.next_column = cell.column() + 1;
            if shelter.order_dig(cell, out) {
                ordered += 1;
            }
        }
        if shelter.spawn_robot(out).is_none() {
            trace!("robot cap reached");
        }
    }

    fn on_dug(&mut self, cell: CellCoord, shelter: &mut Shelter, out: &mut Vec<ShelterEvent>) {
        self.dug += 1;
        if self.dug % 3 != 0 {
            return;
        }
        let kind = ROOM_PLAN[(self.dug / 3 - 1) % ROOM_PLAN.len()];
        if !shelter.order_room(kind, cell, out) {
            debug!(?kind, "room site no longer available");
        }
    }
}

/// Runs the shelter for the requested number of days.
pub(crate) fn run(options: &ShelterOptions) -> Result<ShelterSummary> {
    let mut shelter = Shelter::new(ShelterConfig::with_seed(options.seed));
    let mut store = options.save_dir.as_ref().map(|dir| FileStore::new(dir));

    if options.resume {
        if let Some(store) = &store {
            let resumed = shelter
                .load(store, &options.slot)
                .with_context(|| format!("failed to read slot `{}`", options.slot))?;
            if resumed {
                info!(slot = %options.slot, day = shelter.clock().day(), "resumed shelter");
            } else {
                warn!(slot = %options.slot, "no usable save, starting fresh");
            }
        }
    }

    let last_day = shelter
        .clock()
        .day()
        .saturating_add(options.days.saturating_sub(1));
    let frames = (DAY_BUDGET.as_secs_f64() * f64::from(options.days) / options.dt.as_secs_f64())
        .ceil() as u64;

    let mut foreman = Foreman::default();
    let mut events = Vec::new();
    let mut breaches = 0;
    let mut finished = false;
    foreman.plan_day(&mut shelter, &mut events);

    for _ in 0..frames {
        shelter.update(options.dt, &mut events);
        let batch = std::mem::take(&mut events);
        for event in &batch {
            match event {
                ShelterEvent::JobCompleted {
                    job:
                        Job {
                            kind: JobKind::Dig,
                            cell,
                        },
                    applied: true,
                    ..
                } => foreman.on_dug(*cell, &mut shelter, &mut events),
                ShelterEvent::RoomBuilt { kind, cell } => {
                    info!(?kind, column = cell.column(), row = cell.row(), "room built");
                }
                ShelterEvent::HostileBreached { kind } => debug!(?kind, "entrance breached"),
                ShelterEvent::WaveCleared { breaches: wave, .. } => breaches += wave,
                ShelterEvent::DayStarted { day } => {
                    info!(day, "day started");
                    if let Some(store) = store.as_mut() {
                        shelter
                            .save(store, AUTO_SLOT)
                            .context("failed to auto-save")?;
                    }
                    if *day > last_day {
                        finished = true;
                    } else {
                        foreman.plan_day(&mut shelter, &mut events);
                    }
                }
                ShelterEvent::CampaignWon => finished = true,
                other => trace!(event = ?other),
            }
        }
        if finished {
            break;
        }
    }

    if let Some(store) = store.as_mut() {
        shelter
            .save(store, &options.slot)
            .with_context(|| format!("failed to write slot `{}`", options.slot))?;
    }

    Ok(ShelterSummary {
        day: shelter.clock().day(),
        dwellers: shelter.workforce().dweller_count(),
        robots: shelter.workforce().robot_count(),
        rooms: shelter.rooms().rooms().len(),
        breaches,
        won: shelter.is_won(),
    })
}
