//! Resource-producing capture points.

use minigames_core::{NodeId, NodeLevel, NodeSnapshot, Owner, Vec2};

use crate::{NODE_CAPACITY, NODE_RADIUS};

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) id: NodeId,
    pub(crate) position: Vec2,
    pub(crate) owner: Owner,
    pub(crate) value: f32,
    production_timer: f32,
}

impl Node {
    pub(crate) fn new(id: NodeId, position: Vec2, owner: Owner, value: f32) -> Self {
        Self {
            id,
            position,
            owner,
            value: value.clamp(0.0, NODE_CAPACITY),
            production_timer: 0.0,
        }
    }

    pub(crate) fn level(&self) -> NodeLevel {
        NodeLevel::from_value(self.value)
    }

    pub(crate) fn generation_rate(&self) -> f32 {
        self.level().generation_rate()
    }

    pub(crate) fn max_connections(&self) -> usize {
        self.level().max_connections()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.value >= NODE_CAPACITY
    }

    /// Accumulates production time and emits discrete production ticks.
    ///
    /// Neutral nodes and nodes at capacity keep their timer untouched.
    pub(crate) fn update(&mut self, dt: f32, production_multiplier: f32) {
        if self.owner.is_neutral() || self.is_full() {
            return;
        }

        let rate = self.generation_rate() * production_multiplier;
        if rate <= 0.0 {
            return;
        }

        self.production_timer += dt;
        if self.production_timer >= 1.0 / rate {
            self.value = (self.value + 1.0).min(NODE_CAPACITY);
            self.production_timer = 0.0;
        }
    }

    /// Adds one unit of value, returning `false` when the node was already full.
    pub(crate) fn reinforce(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.value = (self.value + 1.0).min(NODE_CAPACITY);
        true
    }

    /// Applies one hostile hit, returning the previous owner when the node flips.
    pub(crate) fn absorb_hit(&mut self, attacker: Owner) -> Option<Owner> {
        self.value -= 1.0;
        if self.value > 0.0 {
            return None;
        }

        let previous = self.owner;
        self.owner = attacker;
        self.value = self.value.abs();
        Some(previous)
    }

    pub(crate) fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= NODE_RADIUS * NODE_RADIUS
    }

    pub(crate) fn snapshot(&self, outgoing: usize) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            position: self.position,
            radius: NODE_RADIUS,
            owner: self.owner,
            value: self.value,
            capacity: NODE_CAPACITY,
            level: self.level(),
            outgoing,
        }
    }
}
