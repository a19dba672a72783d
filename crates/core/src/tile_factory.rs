//! Tile factory - fresh ids and values for dealt rows

use crate::rng::RandomSource;
use crate::types::{Tile, TileId, TILE_VALUE_MAX, TILE_VALUE_MIN};

/// Hands out tiles with unique, monotonically increasing ids
#[derive(Debug, Clone, Default)]
pub struct TileFactory {
    next_id: u32,
}

impl TileFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform tile value in `[TILE_VALUE_MIN, TILE_VALUE_MAX]`
    pub fn next_value<R: RandomSource>(&mut self, rng: &mut R) -> u8 {
        rng.range_inclusive(TILE_VALUE_MIN as u32, TILE_VALUE_MAX as u32) as u8
    }

    /// One tile per column `0..cols`, all on `row`
    pub fn make_row<R: RandomSource>(&mut self, row: u8, cols: u8, rng: &mut R) -> Vec<Tile> {
        (0..cols)
            .map(|col| {
                let value = self.next_value(rng);
                Tile::new(self.next_id(), value, row, col)
            })
            .collect()
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.next_id
    }

    fn next_id(&mut self) -> TileId {
        self.next_id = self.next_id.wrapping_add(1);
        TileId(self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};

    #[test]
    fn test_make_row_covers_every_column() {
        let mut factory = TileFactory::new();
        let mut rng = SimpleRng::new(5);
        let row = factory.make_row(9, 7, &mut rng);

        assert_eq!(row.len(), 7);
        for (col, tile) in row.iter().enumerate() {
            assert_eq!(tile.col as usize, col);
            assert_eq!(tile.row, 9);
            assert!((1..=9).contains(&tile.value));
        }
    }

    #[test]
    fn test_ids_unique_across_rows() {
        let mut factory = TileFactory::new();
        let mut rng = SimpleRng::new(5);
        let mut ids: Vec<TileId> = factory
            .make_row(9, 7, &mut rng)
            .into_iter()
            .chain(factory.make_row(8, 7, &mut rng))
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 14);
        assert_eq!(factory.issued(), 14);
    }

    #[test]
    fn test_values_follow_random_source() {
        let mut factory = TileFactory::new();
        let mut rng = ScriptedRng::new().with_draws([3, 7, 2]);
        let values: Vec<u8> = factory
            .make_row(4, 3, &mut rng)
            .iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec![3, 7, 2]);
    }
}
