//! Selection evaluator - the player's in-progress pick
//!
//! Each toggle adds or removes one tile, then the running sum is classified
//! against the target:
//!
//! - **Exact**: the ids and sum are handed back and the selection empties
//! - **Over**: the whole selection is discarded (no partial retry)
//! - **Under**: the selection is kept, awaiting further toggles

use crate::types::{SelectionOutcome, TileId};

/// Ordered set of selected tile ids with their running sum
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<TileId>,
    sum: u32,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[TileId] {
        &self.ids
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.sum = 0;
    }

    /// Select or deselect `id` (carrying `value`) and classify against `target`
    ///
    /// An empty selection is always `Under`; a match needs at least one tile.
    pub fn toggle(&mut self, id: TileId, value: u8, target: u32) -> SelectionOutcome {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
            self.sum -= value as u32;
        } else {
            self.ids.push(id);
            self.sum += value as u32;
        }

        let sum = self.sum;
        if self.ids.is_empty() {
            SelectionOutcome::Under { sum }
        } else if sum == target {
            let ids = std::mem::take(&mut self.ids);
            self.sum = 0;
            SelectionOutcome::Exact { ids, sum }
        } else if sum > target {
            self.clear();
            SelectionOutcome::Over { sum }
        } else {
            SelectionOutcome::Under { sum }
        }
    }
}
