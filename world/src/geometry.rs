//! Planar helpers used by the cut gesture.

use minigames_core::Vec2;

/// Reports whether segment `a`–`b` strictly crosses segment `c`–`d`.
///
/// Parallel and collinear segments never intersect, and touching at an
/// endpoint does not count as a crossing.
pub(crate) fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let det = (b.x - a.x) * (d.y - c.y) - (d.x - c.x) * (b.y - a.y);
    if det == 0.0 {
        return false;
    }

    let lambda = ((d.y - c.y) * (d.x - a.x) + (c.x - d.x) * (d.y - a.y)) / det;
    let gamma = ((a.y - b.y) * (d.x - a.x) + (b.x - a.x) * (d.y - a.y)) / det;
    (0.0 < lambda && lambda < 1.0) && (0.0 < gamma && gamma < 1.0)
}
