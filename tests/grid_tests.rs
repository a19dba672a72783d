//! Grid-level tests for gravity, injection and target generation

use sumfall::core::{
    clamp_target, compact_columns, generate_target, inject_row, resolve_match, Grid,
    InjectOutcome, ScriptedRng, SimpleRng, TileFactory,
};
use sumfall::types::{Tile, TileId, COLS, ROWS, TARGET_FALLBACK};

fn tile(id: u32, value: u8, row: u8, col: u8) -> Tile {
    Tile::new(TileId(id), value, row, col)
}

fn grid_with(tiles: Vec<Tile>) -> Grid {
    let mut grid = Grid::new(ROWS, COLS);
    grid.replace_all(tiles);
    grid
}

#[test]
fn test_match_in_column_drops_survivor_to_bottom() {
    // Column 2 holds three tiles; the bottom two are matched away.
    let mut grid = grid_with(vec![
        tile(1, 4, 7, 2),
        tile(2, 5, 8, 2),
        tile(3, 6, 9, 2),
        tile(4, 8, 9, 0),
    ]);
    let mut rng = SimpleRng::new(1);

    let result = resolve_match(&mut grid, &[TileId(2), TileId(3)], &mut rng);

    assert_eq!(result.sum, 11);
    assert_eq!(result.cleared, 2);
    let survivor = grid.tile(TileId(1)).unwrap();
    assert_eq!((survivor.row, survivor.col), (9, 2));
    assert_eq!(grid.occupied_at(9, 0).map(|t| t.id), Some(TileId(4)));
    assert_eq!(grid.len(), 2);
    assert!(grid.is_settled());
}

#[test]
fn test_match_clears_whole_board() {
    let mut grid = grid_with(vec![tile(1, 4, 9, 0), tile(2, 6, 9, 1)]);
    let mut rng = SimpleRng::new(1);

    let result = resolve_match(&mut grid, &[TileId(1), TileId(2)], &mut rng);

    assert!(grid.is_empty());
    assert_eq!(result.target, TARGET_FALLBACK);
}

#[test]
fn test_inject_with_top_row_occupied_is_overflow() {
    let column: Vec<Tile> = (0..ROWS).map(|row| tile(row as u32 + 1, 3, row, 4)).collect();
    let mut grid = grid_with(column);
    let before = grid.clone();
    let mut factory = TileFactory::new();
    let mut rng = SimpleRng::new(9);

    assert_eq!(inject_row(&mut grid, &mut factory, &mut rng), InjectOutcome::Overflow);
    assert_eq!(grid, before);
    assert_eq!(factory.issued(), 0);
}

#[test]
fn test_inject_shifts_existing_tiles_up() {
    let mut grid = grid_with(vec![tile(100, 5, 9, 0), tile(101, 6, 8, 0)]);
    let mut factory = TileFactory::new();
    let mut rng = ScriptedRng::new().with_draws([1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(inject_row(&mut grid, &mut factory, &mut rng), InjectOutcome::Injected);

    assert_eq!(grid.tile(TileId(100)).map(|t| t.row), Some(8));
    assert_eq!(grid.tile(TileId(101)).map(|t| t.row), Some(7));
    let bottom: Vec<u8> = (0..COLS)
        .filter_map(|col| grid.occupied_at(9, col).map(|t| t.value))
        .collect();
    assert_eq!(bottom, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(grid.has_unique_cells());
    assert!(grid.is_settled());
}

#[test]
fn test_target_from_fewer_tiles_than_terms() {
    let tiles = vec![tile(1, 2, 9, 0)];
    // Asks for four terms; only one tile exists, so the raw sum 2 clamps up.
    let mut rng = ScriptedRng::new().with_draws([4]);
    assert_eq!(generate_target(&tiles, &mut rng), 5);
}

#[test]
fn test_target_sums_sampled_tiles() {
    let tiles = vec![
        tile(1, 9, 9, 0),
        tile(2, 1, 9, 1),
        tile(3, 8, 9, 2),
        tile(4, 7, 9, 3),
    ];
    let mut rng = ScriptedRng::new().with_draws([3]).with_pick([0, 2, 3]);
    assert_eq!(generate_target(&tiles, &mut rng), 24);
}

#[test]
fn test_target_clamp_bounds() {
    assert_eq!(clamp_target(0), 5);
    assert_eq!(clamp_target(5), 5);
    assert_eq!(clamp_target(36), 36);
    assert_eq!(clamp_target(45), 45);
    assert_eq!(clamp_target(80), 45);
}

#[test]
fn test_compact_keeps_column_order() {
    let tiles = vec![tile(1, 1, 2, 5), tile(2, 2, 6, 5), tile(3, 3, 4, 5)];
    let out = compact_columns(&tiles, COLS, 9);
    let rows: Vec<(u32, u8)> = out.iter().map(|t| (t.id.0, t.row)).collect();
    assert_eq!(rows, vec![(2, 9), (3, 8), (1, 7)]);
}

#[test]
fn test_cell_values_layout() {
    let grid = grid_with(vec![tile(1, 4, 9, 0), tile(2, 7, 8, 0), tile(3, 2, 9, 6)]);
    let cells = grid.cell_values();
    assert_eq!(cells.len(), ROWS as usize);
    assert_eq!(cells[9][0], 4);
    assert_eq!(cells[8][0], 7);
    assert_eq!(cells[9][6], 2);
    assert_eq!(cells[0].iter().copied().sum::<u8>(), 0);
}
