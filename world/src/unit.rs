//! Resource packets travelling between nodes.

use minigames_core::{NodeId, Owner, UnitId, UnitSnapshot, Vec2};

use crate::{ARRIVAL_EPSILON, UNIT_SPEED};

#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) position: Vec2,
    pub(crate) owner: Owner,
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) active: bool,
}

/// Result of moving a unit for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Travel {
    Idle,
    Moving,
    Arrived,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        position: Vec2,
        owner: Owner,
        source: NodeId,
        target: NodeId,
    ) -> Self {
        Self {
            id,
            position,
            owner,
            source,
            target,
            active: true,
        }
    }

    /// Moves the unit toward the target position without overshooting it.
    pub(crate) fn advance(&mut self, dt: f32, target: Vec2) -> Travel {
        if !self.active {
            return Travel::Idle;
        }

        let delta = target - self.position;
        let distance = delta.length();
        if distance < ARRIVAL_EPSILON {
            return Travel::Arrived;
        }

        let step = (UNIT_SPEED * dt).min(distance);
        self.position += delta / distance * step;
        Travel::Moving
    }

    /// Marks the unit as spent. Returns `false` if it was already inactive.
    pub(crate) fn deactivate(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            position: self.position,
            owner: self.owner,
            source: self.source,
            target: self.target,
        }
    }
}
