//! Row injector - push a fresh row in from the bottom
//!
//! Overflow is judged before the shift: if any tile already sits on the top
//! row, a new row *would* push it out, so nothing moves and the session ends.

use tracing::instrument;

use crate::grid::Grid;
use crate::rng::RandomSource;
use crate::tile_factory::TileFactory;

/// Result of a row injection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Every tile moved up one row and a new bottom row was dealt
    Injected,
    /// The top row was occupied; the grid is untouched
    Overflow,
}

/// Shift every tile up one row and deal a new bottom row
#[instrument(level = "trace", skip_all, fields(tiles = grid.len()))]
pub fn inject_row<R: RandomSource>(
    grid: &mut Grid,
    factory: &mut TileFactory,
    rng: &mut R,
) -> InjectOutcome {
    if grid.is_row_occupied(0) {
        return InjectOutcome::Overflow;
    }

    let mut next: Vec<_> = grid
        .tiles()
        .iter()
        .map(|t| {
            let mut t = *t;
            t.row -= 1;
            t
        })
        .collect();
    next.extend(factory.make_row(grid.bottom_row(), grid.cols(), rng));
    grid.replace_all(next);

    InjectOutcome::Injected
}
