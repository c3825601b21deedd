//! Diggable tile grid the shelter is carved into.

use minigames_core::CellCoord;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of tile columns in a standard shelter.
pub const GRID_COLUMNS: u32 = 24;

/// Number of tile rows in a standard shelter.
pub const GRID_ROWS: u32 = 16;

/// Rows at the top and at the bottom covered by the HUD; workers never enter them.
pub const RESERVED_ROWS: u32 = 2;

const ROCK_CHANCE: f64 = 0.1;

/// Material occupying a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Soft soil, diggable.
    Dirt,
    /// Hard rock, diggable.
    Rock,
    /// Indestructible floor of the map.
    Bedrock,
    /// Excavated space workers can walk through.
    Empty,
    /// Excavated space occupied by a built room.
    Room,
}

impl TileKind {
    /// Reports whether workers may walk through the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Room)
    }

    /// Reports whether digging turns the tile into empty space.
    #[must_use]
    pub const fn is_diggable(self) -> bool {
        matches!(self, TileKind::Dirt | TileKind::Rock)
    }
}

/// Row-major grid of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Creates a grid where every tile has the same kind.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: TileKind) -> Self {
        Self {
            columns,
            rows,
            tiles: vec![kind; columns as usize * rows as usize],
        }
    }

    /// Generates a fresh shelter site: open surface on the top row, bedrock on
    /// the bottom row and dirt with scattered rock in between.
    pub fn generate<R: Rng>(columns: u32, rows: u32, rng: &mut R) -> Self {
        let mut grid = Self::filled(columns, rows, TileKind::Dirt);
        for row in 0..rows {
            for column in 0..columns {
                let kind = if row == 0 {
                    TileKind::Empty
                } else if row + 1 == rows {
                    TileKind::Bedrock
                } else if rng.gen_bool(ROCK_CHANCE) {
                    TileKind::Rock
                } else {
                    TileKind::Dirt
                };
                let _ = grid.set(CellCoord::new(column, row), kind);
            }
        }
        grid
    }

    /// Rebuilds a grid from rows of tiles. Returns `None` for empty or ragged input.
    #[must_use]
    pub fn from_matrix(matrix: &[Vec<TileKind>]) -> Option<Self> {
        let columns = matrix.first()?.len();
        if columns == 0 || matrix.iter().any(|row| row.len() != columns) {
            return None;
        }
        Some(Self {
            columns: u32::try_from(columns).ok()?,
            rows: u32::try_from(matrix.len()).ok()?,
            tiles: matrix.iter().flatten().copied().collect(),
        })
    }

    /// Copies the tiles out as rows, top to bottom.
    #[must_use]
    pub fn matrix(&self) -> Vec<Vec<TileKind>> {
        self.tiles
            .chunks(self.columns.max(1) as usize)
            .map(<[TileKind]>::to_vec)
            .collect()
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies in the rows covered by the HUD.
    #[must_use]
    pub const fn is_reserved(&self, cell: CellCoord) -> bool {
        cell.row() < RESERVED_ROWS || cell.row() + RESERVED_ROWS >= self.rows
    }

    /// Tile stored at the cell, `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell).map(|index| self.tiles[index])
    }

    /// Overwrites the tile at the cell. Returns `false` outside the grid.
    pub fn set(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        match self.index(cell) {
            Some(index) => {
                self.tiles[index] = kind;
                true
            }
            None => false,
        }
    }

    /// Excavates dirt or rock. Bedrock, open tiles and cells outside the grid refuse.
    pub fn dig(&mut self, cell: CellCoord) -> bool {
        match self.tile(cell) {
            Some(kind) if kind.is_diggable() => self.set(cell, TileKind::Empty),
            _ => false,
        }
    }

    /// Furnishes an excavated tile with a room.
    pub fn build_room(&mut self, cell: CellCoord) -> bool {
        match self.tile(cell) {
            Some(TileKind::Empty) => self.set(cell, TileKind::Room),
            _ => false,
        }
    }

    /// Number of tiles of the provided kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }
}
