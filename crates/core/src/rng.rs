//! RNG module - the random source seam
//!
//! Every random decision in the engine (tile values, target term count, which
//! tiles a target is sampled from) goes through [`RandomSource`], so tests can
//! script exact sequences while the game runs on [`SimpleRng`].
//!
//! Also provides a simple LCG for deterministic replays.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

/// Upper bound on how many indices a single sample may draw.
pub const MAX_SAMPLE: usize = 16;

/// Uniform random source used by the tile factory and the target generator.
pub trait RandomSource {
    /// Generate next random u32
    fn next_u32(&mut self) -> u32;

    /// Uniform integer in `[low, high]` (inclusive)
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = high - low + 1;
        low + self.next_u32() % span
    }

    /// Choose `k` distinct indices from `0..n`, uniformly and without replacement.
    ///
    /// `k` is capped at both `n` and [`MAX_SAMPLE`].
    fn sample_indices(&mut self, n: usize, k: usize) -> ArrayVec<usize, MAX_SAMPLE> {
        let k = k.min(n).min(MAX_SAMPLE);
        let mut pool: Vec<usize> = (0..n).collect();
        let mut out = ArrayVec::new();

        // Partial Fisher-Yates: the first k slots end up a uniform k-subset.
        for i in 0..k {
            let j = i + (self.next_u32() as usize) % (n - i);
            pool.swap(i, j);
            out.push(pool[i]);
        }
        out
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Get the current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // Low bits of a power-of-two LCG cycle quickly; hand out the high half.
        self.state >> 16
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Scripted random source for replays and tests.
///
/// `range_inclusive` answers from the queued draws (clamped into the requested
/// range) and `sample_indices` from the queued picks. Once a queue runs dry the
/// draws fall back to `low` and the picks to the first `k` indices.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    draws: VecDeque<u32>,
    picks: VecDeque<Vec<usize>>,
}

impl ScriptedRng {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue values returned by `range_inclusive`, in order.
    pub fn with_draws(mut self, draws: impl IntoIterator<Item = u32>) -> Self {
        self.draws.extend(draws);
        self
    }

    /// Queue one `sample_indices` answer.
    pub fn with_pick(mut self, pick: impl IntoIterator<Item = usize>) -> Self {
        self.picks.push_back(pick.into_iter().collect());
        self
    }

    pub fn push_draw(&mut self, draw: u32) {
        self.draws.push_back(draw);
    }

    pub fn push_pick(&mut self, pick: impl IntoIterator<Item = usize>) {
        self.picks.push_back(pick.into_iter().collect());
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.draws.pop_front().unwrap_or(0)
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.draws
            .pop_front()
            .map(|v| v.clamp(low, high.max(low)))
            .unwrap_or(low)
    }

    fn sample_indices(&mut self, n: usize, k: usize) -> ArrayVec<usize, MAX_SAMPLE> {
        let k = k.min(n).min(MAX_SAMPLE);
        match self.picks.pop_front() {
            Some(pick) => pick.into_iter().filter(|&i| i < n).take(k).collect(),
            None => (0..k).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_rng_replays_queues() {
        let mut rng = ScriptedRng::new().with_draws([3, 100]).with_pick([2, 0]);
        assert_eq!(rng.range_inclusive(1, 9), 3);
        assert_eq!(rng.range_inclusive(1, 9), 9);
        assert_eq!(rng.range_inclusive(2, 4), 2);
        assert_eq!(rng.sample_indices(5, 2).to_vec(), vec![2, 0]);
        assert_eq!(rng.sample_indices(5, 3).to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_coerced() {
        let mut zero = SimpleRng::new(0);
        let mut one = SimpleRng::new(1);
        assert_eq!(zero.next_u32(), one.next_u32());
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = SimpleRng::new(7);
        let mut seen = [false; 10];
        for _ in 0..2000 {
            let v = rng.range_inclusive(1, 9);
            assert!((1..=9).contains(&v), "out of range: {}", v);
            seen[v as usize] = true;
        }
        assert!(seen[1..=9].iter().all(|&s| s), "every value should appear");
    }

    #[test]
    fn test_range_inclusive_degenerate() {
        let mut rng = SimpleRng::new(7);
        assert_eq!(rng.range_inclusive(4, 4), 4);
        assert_eq!(rng.range_inclusive(5, 2), 5);
    }

    #[test]
    fn test_sample_indices_distinct() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..200 {
            let picked = rng.sample_indices(7, 4);
            assert_eq!(picked.len(), 4);
            for (i, a) in picked.iter().enumerate() {
                assert!(*a < 7);
                assert!(!picked[i + 1..].contains(a), "duplicate index {}", a);
            }
        }
    }

    #[test]
    fn test_sample_indices_capped_by_population() {
        let mut rng = SimpleRng::new(3);
        let mut picked = rng.sample_indices(3, 4).to_vec();
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2]);
        assert!(rng.sample_indices(0, 2).is_empty());
    }
}
