//! Directed channels that drain a source node into travelling units.

use minigames_core::{ConnectionSnapshot, NodeId, Owner, Vec2};

use crate::{node::Node, GROWTH_DURATION};

#[derive(Clone, Debug)]
pub(crate) struct Connection {
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) owner: Owner,
    start: Vec2,
    end: Vec2,
    distance: f32,
    angle: f32,
    growth_elapsed: f32,
    transfer_timer: f32,
}

impl Connection {
    /// Creates a connection between two nodes. Endpoints are assumed stationary.
    pub(crate) fn new(from: &Node, to: &Node) -> Self {
        let delta = to.position - from.position;
        Self {
            from: from.id,
            to: to.id,
            owner: from.owner,
            start: from.position,
            end: to.position,
            distance: delta.length(),
            angle: delta.y.atan2(delta.x),
            growth_elapsed: 0.0,
            transfer_timer: 0.0,
        }
    }

    pub(crate) fn start(&self) -> Vec2 {
        self.start
    }

    pub(crate) fn end(&self) -> Vec2 {
        self.end
    }

    pub(crate) fn is_fully_grown(&self) -> bool {
        self.growth_elapsed >= GROWTH_DURATION
    }

    pub(crate) fn growth_fraction(&self) -> f32 {
        (self.growth_elapsed / GROWTH_DURATION).clamp(0.0, 1.0)
    }

    /// Length of cable currently drawn. Contested cables stop at the midpoint.
    pub(crate) fn visible_length(&self, contested: bool) -> f32 {
        let effective = if contested {
            self.distance / 2.0
        } else {
            self.distance
        };
        (self.growth_fraction() * self.distance).min(effective)
    }

    /// Advances growth and flow, debiting the source when a transfer fires.
    ///
    /// Returns `true` when exactly one unit of value left the source and a
    /// unit must be spawned.
    pub(crate) fn update(&mut self, dt: f32, source: &mut Node) -> bool {
        if !self.is_fully_grown() {
            self.growth_elapsed = (self.growth_elapsed + dt).min(GROWTH_DURATION);
        }

        if !self.is_fully_grown() || source.value < 1.0 {
            return false;
        }

        let transfer_rate = source.generation_rate() / 2.0;
        self.transfer_timer += dt;
        if self.transfer_timer < 1.0 / transfer_rate {
            return false;
        }

        self.transfer_timer = 0.0;
        source.value -= 1.0;
        true
    }

    pub(crate) fn snapshot(&self, contested: bool) -> ConnectionSnapshot {
        ConnectionSnapshot {
            from: self.from,
            to: self.to,
            owner: self.owner,
            start: self.start,
            end: self.end,
            growth: self.growth_fraction(),
            length: self.visible_length(contested),
            distance: self.distance,
            angle: self.angle,
            contested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Node, Node) {
        (
            Node::new(NodeId::new(0), Vec2::new(0.0, 0.0), Owner::Player, 10.0),
            Node::new(NodeId::new(1), Vec2::new(300.0, 0.0), Owner::Neutral, 10.0),
        )
    }

    #[test]
    fn grows_before_transferring() {
        let (mut from, to) = pair();
        let mut connection = Connection::new(&from, &to);

        assert!(!connection.update(0.25, &mut from));
        assert!((connection.visible_length(false) - 150.0).abs() < 1e-3);
        assert!(!connection.is_fully_grown());
        assert_eq!(from.value, 10.0);

        assert!(!connection.update(0.25, &mut from));
        assert!(connection.is_fully_grown());
        assert!((connection.visible_length(false) - 300.0).abs() < 1e-3);
    }

    #[test]
    fn contested_cable_stops_at_midpoint() {
        let (from, to) = pair();
        let mut connection = Connection::new(&from, &to);
        connection.growth_elapsed = GROWTH_DURATION;
        assert!((connection.visible_length(true) - 150.0).abs() < 1e-3);
        assert!((connection.snapshot(true).angle).abs() < 1e-6);
    }

    #[test]
    fn transfer_debits_exactly_one() {
        let (mut from, to) = pair();
        let mut connection = Connection::new(&from, &to);
        connection.growth_elapsed = GROWTH_DURATION;

        // Level one transfers at 0.55 per second.
        let mut transfers = 0;
        for _ in 0..19 {
            if connection.update(0.1, &mut from) {
                transfers += 1;
            }
        }
        assert_eq!(transfers, 1);
        assert_eq!(from.value, 9.0);
    }

    #[test]
    fn empty_source_does_not_transfer() {
        let (mut from, to) = pair();
        from.value = 0.5;
        let mut connection = Connection::new(&from, &to);
        connection.growth_elapsed = GROWTH_DURATION;
        for _ in 0..100 {
            assert!(!connection.update(0.1, &mut from));
        }
        assert_eq!(from.value, 0.5);
    }
}
