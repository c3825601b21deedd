#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pointer gesture system translating drags into connection and cut commands.

use minigames_core::{Command, Event, NodeId, NodeSnapshot, NodeView, Owner, Vec2};

/// Gesture currently tracked by the input system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// No pointer interaction in progress.
    Idle,
    /// Dragging a new connection out of an owned node.
    Dragging {
        /// Node the connection starts at.
        from: NodeId,
        /// Centre of the origin node, where the preview line starts.
        origin: Vec2,
        /// Latest pointer position.
        cursor: Vec2,
    },
    /// Swiping a cut line across the board.
    Cutting {
        /// Point where the swipe started.
        start: Vec2,
        /// Latest pointer position.
        cursor: Vec2,
    },
}

impl Gesture {
    /// Segment an adapter should draw as gesture feedback, if any.
    #[must_use]
    pub const fn preview(&self) -> Option<(Vec2, Vec2)> {
        match *self {
            Gesture::Idle => None,
            Gesture::Dragging { origin, cursor, .. } => Some((origin, cursor)),
            Gesture::Cutting { start, cursor } => Some((start, cursor)),
        }
    }
}

/// Input system bound to the side the local player controls.
#[derive(Clone, Debug)]
pub struct Input {
    side: Owner,
    gesture: Gesture,
    locked: bool,
}

impl Input {
    /// Creates an idle input system acting on behalf of `side`.
    #[must_use]
    pub const fn new(side: Owner) -> Self {
        Self {
            side,
            gesture: Gesture::Idle,
            locked: false,
        }
    }

    /// Side the gestures act for.
    #[must_use]
    pub const fn side(&self) -> Owner {
        self.side
    }

    /// Gesture currently in progress.
    #[must_use]
    pub const fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Observes world events. A frozen simulation drops the current gesture
    /// and ignores new ones until the next level is generated.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SimulationFrozen => {
                    self.locked = true;
                    self.gesture = Gesture::Idle;
                }
                Event::LevelGenerated { .. } => {
                    self.locked = false;
                    self.gesture = Gesture::Idle;
                }
                _ => {}
            }
        }
    }

    /// Starts a drag when the pointer lands on an owned node, a cut otherwise.
    pub fn pointer_down(&mut self, point: Vec2, nodes: &NodeView) {
        let dragged = nodes
            .node_at(point)
            .is_some_and(|node| self.begin_drag_from(node));
        if !dragged {
            self.begin_cut(point);
        }
    }

    /// Starts dragging a connection out of `node`. Returns `false` when the
    /// node does not belong to the local side.
    pub fn begin_drag_from(&mut self, node: &NodeSnapshot) -> bool {
        if self.locked || node.owner != self.side {
            return false;
        }
        self.gesture = Gesture::Dragging {
            from: node.id,
            origin: node.position,
            cursor: node.position,
        };
        true
    }

    /// Starts a cut swipe at `point`.
    pub fn begin_cut(&mut self, point: Vec2) {
        if self.locked {
            return;
        }
        self.gesture = Gesture::Cutting {
            start: point,
            cursor: point,
        };
    }

    /// Tracks the pointer while a gesture is in progress.
    pub fn update_cursor(&mut self, point: Vec2) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { cursor, .. } | Gesture::Cutting { cursor, .. } => *cursor = point,
        }
    }

    /// Releases the pointer, resolving the gesture into at most one command.
    ///
    /// A drag resolves to `CreateConnection` when released over another node;
    /// a swipe resolves to `Cut` when it covers any distance.
    pub fn end_drag(&mut self, point: Vec2, nodes: &NodeView, out: &mut Vec<Command>) {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => {}
            Gesture::Dragging { from, .. } => {
                if let Some(target) = nodes.node_at(point) {
                    if target.id != from {
                        out.push(Command::CreateConnection {
                            from,
                            to: target.id,
                        });
                    }
                }
            }
            Gesture::Cutting { start, .. } => {
                if start != point {
                    out.push(Command::Cut {
                        start,
                        end: point,
                        actor: self.side,
                    });
                }
            }
        }
    }

    /// Abandons the current gesture without emitting anything.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }
}
