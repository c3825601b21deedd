//! Room catalogue and the worker buffs rooms provide.

use minigames_core::CellCoord;
use serde::{Deserialize, Serialize};

/// Movement speed of a dweller in a shelter without buffs, in tiles per second.
pub const BASE_WORKER_SPEED: f32 = 2.0;

/// Work speed multiplier of a dweller in a shelter without buffs.
pub const BASE_WORK_SPEED: f32 = 1.0;

const WATER_TREATMENT_SPEED_BONUS: f32 = 0.5;
const MEDBAY_WORK_SPEED_BONUS: f32 = 0.2;

/// Kinds of rooms that can be furnished in excavated tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// Housing for dwellers.
    LivingQuarters,
    /// Generates power.
    PowerPlant,
    /// Feeds dwellers.
    Diner,
    /// Clean water; dwellers walk faster.
    WaterTreatment,
    /// Weapons storage; strengthens the shelter's defences.
    Armory,
    /// Medical care; dwellers work faster.
    Medbay,
    /// Crafting benches.
    Workshop,
}

impl RoomKind {
    /// Every room kind in build-menu order.
    pub const ALL: [RoomKind; 7] = [
        RoomKind::LivingQuarters,
        RoomKind::PowerPlant,
        RoomKind::Diner,
        RoomKind::WaterTreatment,
        RoomKind::Armory,
        RoomKind::Medbay,
        RoomKind::Workshop,
    ];

    /// Build cost in scrap.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            RoomKind::LivingQuarters => 100,
            RoomKind::PowerPlant | RoomKind::Diner | RoomKind::WaterTreatment => 150,
            RoomKind::Armory => 200,
            RoomKind::Medbay => 300,
            RoomKind::Workshop => 500,
        }
    }
}

/// Worker statistics derived from the rooms that exist.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkerStats {
    /// Dweller movement speed in tiles per second.
    pub speed: f32,
    /// Multiplier applied to job progress.
    pub work_speed: f32,
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self {
            speed: BASE_WORKER_SPEED,
            work_speed: BASE_WORK_SPEED,
        }
    }
}

/// A furnished room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// What the room is.
    pub kind: RoomKind,
    /// Tile the room occupies.
    pub cell: CellCoord,
}

/// Registry of built rooms.
#[derive(Clone, Debug, Default)]
pub struct RoomLedger {
    rooms: Vec<Room>,
}

impl RoomLedger {
    /// Records a new room and returns the recomputed worker stats.
    pub fn add(&mut self, kind: RoomKind, cell: CellCoord) -> WorkerStats {
        self.rooms.push(Room { kind, cell });
        self.stats()
    }

    /// Rooms in build order.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of rooms of the provided kind.
    #[must_use]
    pub fn count(&self, kind: RoomKind) -> usize {
        self.rooms.iter().filter(|room| room.kind == kind).count()
    }

    /// Worker stats starting from the base values plus every room's buff.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.rooms
            .iter()
            .fold(WorkerStats::default(), |mut stats, room| {
                match room.kind {
                    RoomKind::WaterTreatment => stats.speed += WATER_TREATMENT_SPEED_BONUS,
                    RoomKind::Medbay => stats.work_speed += MEDBAY_WORK_SPEED_BONUS,
                    RoomKind::LivingQuarters
                    | RoomKind::PowerPlant
                    | RoomKind::Diner
                    | RoomKind::Armory
                    | RoomKind::Workshop => {}
                }
                stats
            })
    }

    /// Forgets every room.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}
