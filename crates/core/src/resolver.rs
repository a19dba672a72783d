//! Match resolver - removal plus per-column gravity
//!
//! After an exact match the selected tiles leave the grid and every column is
//! recompacted independently: its surviving tiles keep their relative order and
//! are restacked against the bottom row.

use tracing::instrument;

use crate::grid::Grid;
use crate::rng::RandomSource;
use crate::target::generate_target;
use crate::types::{Tile, TileId};

/// What a resolved match produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Sum of the removed tiles (fed to scoring)
    pub sum: u32,
    /// Number of tiles actually removed
    pub cleared: u32,
    /// Target generated from the compacted grid
    pub target: u32,
}

/// Remove `matched` from the grid, compact columns and draw a new target
///
/// Ids that are not on the grid contribute nothing.
#[instrument(level = "trace", skip_all, fields(matched = matched.len()))]
pub fn resolve_match<R: RandomSource>(grid: &mut Grid, matched: &[TileId], rng: &mut R) -> MatchResult {
    let (sum, cleared) = grid
        .tiles()
        .iter()
        .filter(|t| matched.contains(&t.id))
        .fold((0u32, 0u32), |(sum, n), t| (sum + t.value as u32, n + 1));

    let bottom = grid.bottom_row();
    let cols = grid.cols();
    let compacted = compact_columns(grid.remove_tiles(matched), cols, bottom);
    grid.replace_all(compacted);

    let target = generate_target(grid.tiles(), rng);
    MatchResult {
        sum,
        cleared,
        target,
    }
}

/// Restack every column so its tiles occupy `bottom, bottom - 1, ...`
///
/// Within a column tiles are ordered bottom-most first before reassignment,
/// so relative order is preserved.
pub fn compact_columns(tiles: &[Tile], cols: u8, bottom: u8) -> Vec<Tile> {
    let mut out = Vec::with_capacity(tiles.len());
    for col in 0..cols {
        let mut column: Vec<Tile> = tiles.iter().filter(|t| t.col == col).copied().collect();
        column.sort_by(|a, b| b.row.cmp(&a.row));
        for (depth, mut tile) in column.into_iter().enumerate() {
            tile.row = bottom - depth as u8;
            out.push(tile);
        }
    }
    out
}
