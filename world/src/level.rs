//! Procedural node layout.

use minigames_core::{Bounds, Vec2};
use rand::Rng;

use crate::LayoutConfig;

/// Outcome of scattering nodes across the playable area.
#[derive(Clone, Debug, Default)]
pub(crate) struct Layout {
    pub(crate) requested: usize,
    pub(crate) positions: Vec<Vec2>,
    pub(crate) failed: Vec<usize>,
}

/// Scatters nodes with rejection sampling against the minimum spacing.
///
/// Attempts that exhaust their retry budget are recorded in `failed` and the
/// node is omitted.
pub(crate) fn scatter<R: Rng>(rng: &mut R, bounds: Bounds, config: &LayoutConfig) -> Layout {
    let minimum = config.min_nodes.min(config.max_nodes);
    let maximum = config.max_nodes.max(minimum);
    let requested = rng.gen_range(minimum..=maximum);

    let span_x = (bounds.width() - config.padding * 2.0).max(0.0);
    let span_y = (bounds.height() - config.padding * 2.0).max(0.0);
    let min_distance_squared = config.min_distance * config.min_distance;

    let mut layout = Layout {
        requested,
        positions: Vec::with_capacity(requested),
        failed: Vec::new(),
    };

    for index in 0..requested {
        let mut placed = None;
        for _ in 0..config.placement_attempts {
            let candidate = Vec2::new(
                config.padding + rng.gen::<f32>() * span_x,
                config.padding + rng.gen::<f32>() * span_y,
            );
            let clear = layout
                .positions
                .iter()
                .all(|existing| existing.distance_squared(candidate) >= min_distance_squared);
            if clear {
                placed = Some(candidate);
                break;
            }
        }

        match placed {
            Some(position) => layout.positions.push(position),
            None => layout.failed.push(index),
        }
    }

    layout
}
