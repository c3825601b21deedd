//! A* search across the shelter grid.

use std::collections::HashSet;

use minigames_core::CellCoord;

use crate::grid::TileGrid;

/// Neighbour offsets in expansion order: up, down, left, right.
const NEIGHBOURS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: CellCoord,
    g: u32,
    f: u32,
    parent: Option<usize>,
}

/// Finds a 4-connected path from `start` to `goal` using a Manhattan heuristic.
///
/// Only empty and room tiles are entered, except the goal itself which may be
/// solid (workers dig into it). The reserved HUD rows are never entered. The
/// returned path begins with `start` and ends with `goal`.
///
/// Ties on `f` resolve to the earliest node in the open list, so the result is
/// deterministic for a given grid.
#[must_use]
pub fn find_path(grid: &TileGrid, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
    let mut arena = vec![SearchNode {
        cell: start,
        g: 0,
        f: start.manhattan_distance(goal),
        parent: None,
    }];
    let mut open: Vec<usize> = vec![0];
    let mut closed: HashSet<CellCoord> = HashSet::new();

    while !open.is_empty() {
        let mut best = 0;
        for (position, &candidate) in open.iter().enumerate().skip(1) {
            if arena[candidate].f < arena[open[best]].f {
                best = position;
            }
        }
        let current = open.remove(best);
        let node = arena[current];
        let _ = closed.insert(node.cell);

        if node.cell == goal {
            return Some(reconstruct(&arena, current));
        }

        for (columns, rows) in NEIGHBOURS {
            let Some(cell) = node.cell.offset(columns, rows) else {
                continue;
            };
            if !enterable(grid, cell, goal) || closed.contains(&cell) {
                continue;
            }

            let g = node.g + 1;
            let queued = open.iter().find(|&&index| arena[index].cell == cell);
            if queued.is_some_and(|&index| g > arena[index].g) {
                continue;
            }

            arena.push(SearchNode {
                cell,
                g,
                f: g + cell.manhattan_distance(goal),
                parent: Some(current),
            });
            open.push(arena.len() - 1);
        }
    }

    None
}

fn enterable(grid: &TileGrid, cell: CellCoord, goal: CellCoord) -> bool {
    if grid.is_reserved(cell) {
        return false;
    }
    match grid.tile(cell) {
        Some(kind) => cell == goal || kind.is_walkable(),
        None => false,
    }
}

fn reconstruct(arena: &[SearchNode], end: usize) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = Some(end);
    while let Some(index) = cursor {
        path.push(arena[index].cell);
        cursor = arena[index].parent;
    }
    path.reverse();
    path
}
