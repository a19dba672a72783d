//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, adapter protocol, headless runners).
//!
//! # Grid Dimensions
//!
//! Default playfield dimensions:
//!
//! - **Rows**: 10 (indexed 0-9, row 0 is the top, row 9 the bottom)
//! - **Columns**: 7 (indexed 0-6)
//! - **Initial rows**: 1 bottom row is dealt when a session starts
//!
//! # Numbers
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TILE_VALUE_MIN` | 1 | Smallest tile value |
//! | `TILE_VALUE_MAX` | 9 | Largest tile value |
//! | `TARGET_MIN` | 5 | Lower clamp for generated targets |
//! | `TARGET_MAX` | 45 | Upper clamp for generated targets |
//! | `TARGET_FALLBACK` | 10 | Target used when the grid is empty |
//! | `TARGET_TERMS_MIN` | 2 | Fewest tiles summed into a target |
//! | `TARGET_TERMS_MAX` | 4 | Most tiles summed into a target |
//! | `TIMED_MODE_INTERVAL` | 10 | Time units between timed row injections |
//!
//! # Examples
//!
//! ```
//! use sumfall_types::{SessionCommand, SessionMode, Tile, TileId, COLS, ROWS};
//!
//! let mode = SessionMode::from_str("timed").unwrap();
//! assert_eq!(mode, SessionMode::Timed);
//!
//! let cmd = SessionCommand::from_str("pause").unwrap();
//! assert_eq!(cmd, SessionCommand::Pause);
//!
//! let tile = Tile::new(TileId(1), 7, ROWS - 1, 0);
//! assert_eq!(tile.value, 7);
//! assert_eq!(COLS, 7);
//! ```

/// Grid height in cells (10 rows)
pub const ROWS: u8 = 10;

/// Grid width in cells (7 columns)
pub const COLS: u8 = 7;

/// Number of rows dealt at session start
pub const INITIAL_ROWS: u8 = 1;

/// Time units between row injections in timed mode
pub const TIMED_MODE_INTERVAL: u32 = 10;

/// Smallest value a tile can carry
pub const TILE_VALUE_MIN: u8 = 1;

/// Largest value a tile can carry
pub const TILE_VALUE_MAX: u8 = 9;

/// Lower clamp for generated targets
pub const TARGET_MIN: u32 = 5;

/// Upper clamp for generated targets
pub const TARGET_MAX: u32 = 45;

/// Target handed out when there are no tiles to sample
pub const TARGET_FALLBACK: u32 = 10;

/// Fewest tiles summed into a generated target
pub const TARGET_TERMS_MIN: u32 = 2;

/// Most tiles summed into a generated target
pub const TARGET_TERMS_MAX: u32 = 4;


/// Opaque, stable tile identity.
///
/// Ids are handed out monotonically by the tile factory and never reused within
/// a factory's lifetime, so a stale id held by a presentation layer can never
/// alias a newer tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// A numbered tile placed on the grid.
///
/// `(row, col)` changes over the tile's lifetime as gravity and row injection
/// reposition it; `id` and `value` never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub value: u8,
    pub row: u8,
    pub col: u8,
}

impl Tile {
    pub fn new(id: TileId, value: u8, row: u8, col: u8) -> Self {
        Self {
            id,
            value,
            row,
            col,
        }
    }
}

/// How rows get injected during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// A new row after every successful match
    TurnBased,
    /// A new row whenever the countdown expires
    Timed,
}

impl SessionMode {
    /// Parse a session mode from string (case-insensitive)
    ///
    /// `classic` is accepted as an alias for turn-based play.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "turnbased" | "turn_based" | "turn-based" | "classic" => Some(SessionMode::TurnBased),
            "timed" | "time" => Some(SessionMode::Timed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::TurnBased => "turnBased",
            SessionMode::Timed => "timed",
        }
    }
}

/// Session lifecycle: `Ready -> Playing -> {Paused <-> Playing} -> GameOver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Ready,
    Playing,
    Paused,
    GameOver,
}

impl SessionPhase {
    /// Only a playing session accepts toggles and row injections.
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionPhase::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Ready => "ready",
            SessionPhase::Playing => "playing",
            SessionPhase::Paused => "paused",
            SessionPhase::GameOver => "gameOver",
        }
    }
}

/// Classification of the running selection sum against the target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionOutcome {
    /// Sum hit the target; `ids` were consumed by the match.
    Exact { ids: Vec<TileId>, sum: u32 },
    /// Sum overshot the target; the selection was discarded.
    Over { sum: u32 },
    /// Sum is still short of the target; the selection is kept.
    Under { sum: u32 },
}

impl SelectionOutcome {
    pub fn is_exact(&self) -> bool {
        matches!(self, SelectionOutcome::Exact { .. })
    }

    /// Selection sum at the moment of classification
    pub fn sum(&self) -> u32 {
        match self {
            SelectionOutcome::Exact { sum, .. }
            | SelectionOutcome::Over { sum }
            | SelectionOutcome::Under { sum } => *sum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionOutcome::Exact { .. } => "exact",
            SelectionOutcome::Over { .. } => "over",
            SelectionOutcome::Under { .. } => "under",
        }
    }
}

/// Notable state transitions, drained by observers after each command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    Started { mode: SessionMode, target: u32 },
    Matched { sum: u32, cleared: u32, target: u32 },
    RowInjected { row: u8 },
    Overflow,
    Paused,
    Resumed,
    Reset,
}

/// Argument-free session commands
///
/// Commands that carry data (start with a mode, toggle with a tile id) are
/// expressed by the caller directly; these are the bare control verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCommand {
    Tick,
    Pause,
    Resume,
    Reset,
}

impl SessionCommand {
    /// Parse a command from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tick" => Some(SessionCommand::Tick),
            "pause" => Some(SessionCommand::Pause),
            "resume" => Some(SessionCommand::Resume),
            "reset" => Some(SessionCommand::Reset),
            _ => None,
        }
    }
}
