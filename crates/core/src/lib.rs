//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **zero dependencies** on rendering, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed (or scripted random source) produces identical games
//! - **Testable**: Every random decision goes through an injectable [`RandomSource`]
//! - **Portable**: Can run in any environment (terminal, GUI, headless bot)
//! - **Serialized**: One owner, one mutation at a time; no partial grids are observable
//!
//! # Module Structure
//!
//! - [`grid`]: sparse 10x7 tile grid with occupancy queries and invariant checks
//! - [`tile_factory`]: fresh tile ids and uniform 1-9 values for dealt rows
//! - [`target`]: target sums drawn from 2-4 random tiles, clamped into 5..=45
//! - [`selection`]: toggled selection and its exact/over/under classification
//! - [`resolver`]: match removal and per-column gravity compaction
//! - [`injector`]: bottom-row injection and overflow detection
//! - [`countdown`]: explicit cancelable countdown for timed mode
//! - [`session`]: the session controller tying everything together
//! - [`config`]: grid shape and pacing, validated at construction
//! - [`rng`]: the random source seam plus seeded and scripted sources
//!
//! # Game Rules
//!
//! - Tiles accumulate row by row from the bottom
//! - Select tiles whose values sum exactly to the target to clear them
//! - Overshooting the target discards the selection
//! - Cleared columns collapse downward
//! - **Turn-based**: a new row arrives after every match
//! - **Timed**: a new row arrives every 10 time units
//! - The game ends when a new row would push a tile off the top
//!
//! # Example
//!
//! ```
//! use sumfall_core::GameSession;
//! use sumfall_types::{SessionMode, SessionPhase};
//!
//! // Create and start a session
//! let mut session = GameSession::new(12345);
//! let snap = session.start(SessionMode::Timed);
//! assert_eq!(snap.tiles.len(), 7);
//!
//! // Drive the clock: one tick per time unit
//! for _ in 0..10 {
//!     session.tick();
//! }
//! assert_eq!(session.current_grid().len(), 14);
//! assert_eq!(session.phase(), SessionPhase::Playing);
//! ```

pub mod config;
pub mod countdown;
pub mod grid;
pub mod injector;
pub mod resolver;
pub mod rng;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod target;
pub mod tile_factory;

pub use sumfall_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, SessionConfig};
pub use countdown::Countdown;
pub use grid::Grid;
pub use injector::{inject_row, InjectOutcome};
pub use resolver::{compact_columns, resolve_match, MatchResult};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use selection::Selection;
pub use session::GameSession;
pub use snapshot::SessionSnapshot;
pub use target::{clamp_target, generate_target};
pub use tile_factory::TileFactory;
