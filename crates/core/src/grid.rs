//! Grid module - the tile population
//!
//! The grid is a sparse set of tiles over a fixed `rows x cols` coordinate space.
//! Coordinates: (row, col) where row 0 is the top and `rows - 1` the bottom.
//!
//! The grid does not police its own invariants (one tile per cell, no floating
//! tiles); the match resolver and row injector establish them before every
//! [`Grid::replace_all`].

use crate::types::{Tile, TileId};

/// The playfield - tiles stored sparsely, ordered by insertion
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: u8,
    cols: u8,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            tiles: Vec::with_capacity(rows as usize * cols as usize),
        }
    }

    /// Get height of the grid
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Get width of the grid
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Index of the bottom row
    pub fn bottom_row(&self) -> u8 {
        self.rows - 1
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, row: u8, col: u8) -> bool {
        row >= self.rows || col >= self.cols
    }

    /// Tile at (row, col), if any
    pub fn occupied_at(&self, row: u8, col: u8) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.row == row && t.col == col)
    }

    /// Look a tile up by id
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// All placed tiles
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if any tile sits on the given row
    pub fn is_row_occupied(&self, row: u8) -> bool {
        self.tiles.iter().any(|t| t.row == row)
    }

    /// Tiles of one column, unordered
    pub fn column(&self, col: u8) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().filter(move |t| t.col == col)
    }

    /// Drop every tile whose id is in `ids` and return what is left
    ///
    /// Unknown ids are ignored.
    pub fn remove_tiles(&mut self, ids: &[TileId]) -> &[Tile] {
        self.tiles.retain(|t| !ids.contains(&t.id));
        &self.tiles
    }

    /// Swap in a complete tile population in one step
    pub fn replace_all(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Cell values in row-major order (0 = empty), for display and hashing
    pub fn cell_values(&self) -> Vec<Vec<u8>> {
        let mut cells = vec![vec![0u8; self.cols as usize]; self.rows as usize];
        for t in &self.tiles {
            if !self.is_out_of_bounds(t.row, t.col) {
                cells[t.row as usize][t.col as usize] = t.value;
            }
        }
        cells
    }

    /// One tile per cell and every tile in bounds
    pub fn has_unique_cells(&self) -> bool {
        let mut seen = vec![false; self.rows as usize * self.cols as usize];
        for t in &self.tiles {
            if self.is_out_of_bounds(t.row, t.col) {
                return false;
            }
            let idx = t.row as usize * self.cols as usize + t.col as usize;
            if seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }

    /// Every column is a contiguous run of tiles ending at the bottom row
    pub fn is_settled(&self) -> bool {
        (0..self.cols).all(|col| {
            let height = self.column(col).count();
            let mut rows: Vec<u8> = self.column(col).map(|t| t.row).collect();
            rows.sort_unstable();
            rows.iter()
                .enumerate()
                .all(|(i, &row)| row as usize == self.rows as usize - height + i)
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::types::ROWS, crate::types::COLS)
    }
}
