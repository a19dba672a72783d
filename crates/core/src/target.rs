//! Target generator
//!
//! A target is the sum of 2-4 randomly chosen tiles, clamped into
//! `[TARGET_MIN, TARGET_MAX]`. The clamp can produce a value no subset of the
//! board reaches; that dead end is part of the rules and is not resampled.

use crate::rng::RandomSource;
use crate::types::{Tile, TARGET_FALLBACK, TARGET_MAX, TARGET_MIN, TARGET_TERMS_MAX, TARGET_TERMS_MIN};

/// Pick a target sum from the current tile population
pub fn generate_target<R: RandomSource>(tiles: &[Tile], rng: &mut R) -> u32 {
    if tiles.is_empty() {
        return TARGET_FALLBACK;
    }

    let terms = rng.range_inclusive(TARGET_TERMS_MIN, TARGET_TERMS_MAX) as usize;
    let k = terms.min(tiles.len());

    let raw: u32 = rng
        .sample_indices(tiles.len(), k)
        .iter()
        .map(|&i| tiles[i].value as u32)
        .sum();

    clamp_target(raw)
}

/// Clamp a raw subset sum into the playable target range
pub fn clamp_target(raw: u32) -> u32 {
    raw.clamp(TARGET_MIN, TARGET_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};
    use crate::types::TileId;

    fn row(values: &[u8]) -> Vec<Tile> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Tile::new(TileId(i as u32 + 1), v, 9, i as u8))
            .collect()
    }

    #[test]
    fn test_empty_grid_falls_back() {
        let mut rng = SimpleRng::new(1);
        assert_eq!(generate_target(&[], &mut rng), 10);
    }

    #[test]
    fn test_sums_sampled_tiles() {
        let tiles = row(&[3, 7, 2, 9, 1, 5, 4]);
        let mut rng = ScriptedRng::new().with_draws([3]).with_pick([1, 3, 6]);
        assert_eq!(generate_target(&tiles, &mut rng), 7 + 9 + 4);
    }

    #[test]
    fn test_low_sum_clamped_up() {
        let tiles = row(&[1, 1, 2]);
        let mut rng = ScriptedRng::new().with_draws([2]).with_pick([0, 1]);
        assert_eq!(generate_target(&tiles, &mut rng), 5);
    }

    #[test]
    fn test_high_sum_clamped_down() {
        assert_eq!(clamp_target(46), 45);
        assert_eq!(clamp_target(4), 5);
        assert_eq!(clamp_target(0), 5);
        assert_eq!(clamp_target(23), 23);
    }

    #[test]
    fn test_term_count_capped_by_population() {
        // A single tile: k = min(1, 4) = 1, so the target is that tile (clamped).
        let tiles = row(&[8]);
        let mut rng = ScriptedRng::new().with_draws([4]);
        assert_eq!(generate_target(&tiles, &mut rng), 8);
    }

    #[test]
    fn test_random_targets_within_bounds() {
        let tiles = row(&[9, 9, 9, 9, 9, 9, 9]);
        let mut rng = SimpleRng::new(42);
        for _ in 0..500 {
            let target = generate_target(&tiles, &mut rng);
            assert!((18..=36).contains(&target), "unexpected target {}", target);
        }
    }
}
