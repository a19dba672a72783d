use crate::types::{SessionMode, SessionPhase, Tile, TileId, COLS, ROWS};

/// Plain value copy of a session, handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSnapshot {
    pub rows: u8,
    pub cols: u8,
    pub tiles: Vec<Tile>,
    pub target: u32,
    pub selection: Vec<TileId>,
    pub selection_sum: u32,
    pub score: u32,
    pub mode: SessionMode,
    pub phase: SessionPhase,
    /// Ticks until the next timed injection (timed mode, armed countdown only)
    pub countdown: Option<u32>,
    pub episode_id: u32,
    pub matches: u32,
    pub rows_injected: u32,
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    /// Tile values as a `rows x cols` matrix, 0 for empty cells
    pub fn cell_values(&self) -> Vec<Vec<u8>> {
        let mut cells = vec![vec![0u8; self.cols as usize]; self.rows as usize];
        for t in &self.tiles {
            if let Some(cell) = cells
                .get_mut(t.row as usize)
                .and_then(|r| r.get_mut(t.col as usize))
            {
                *cell = t.value;
            }
        }
        cells
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            rows: ROWS,
            cols: COLS,
            tiles: Vec::new(),
            target: 0,
            selection: Vec::new(),
            selection_sum: 0,
            score: 0,
            mode: SessionMode::TurnBased,
            phase: SessionPhase::Ready,
            countdown: None,
            episode_id: 0,
            matches: 0,
            rows_injected: 0,
        }
    }
}
