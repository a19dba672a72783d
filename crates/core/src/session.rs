//! Session module - the single owner of game state
//!
//! This module ties together all core components: grid, tile factory, target
//! generator, selection, match resolver, row injector and countdown. Every
//! mutation funnels through [`GameSession`], one call at a time, so observers
//! only ever see settled grids.

use arrayvec::ArrayVec;
use tracing::{debug, info};

use crate::config::{ConfigError, SessionConfig};
use crate::countdown::Countdown;
use crate::grid::Grid;
use crate::injector::{inject_row, InjectOutcome};
use crate::resolver::resolve_match;
use crate::rng::{RandomSource, SimpleRng};
use crate::selection::Selection;
use crate::snapshot::SessionSnapshot;
use crate::target::generate_target;
use crate::tile_factory::TileFactory;
use crate::types::*;

/// Events kept between drains; the oldest is dropped when full.
const MAX_PENDING_EVENTS: usize = 8;

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession<R: RandomSource = SimpleRng> {
    config: SessionConfig,
    grid: Grid,
    factory: TileFactory,
    selection: Selection,
    countdown: Countdown,
    rng: R,
    mode: SessionMode,
    phase: SessionPhase,
    target: u32,
    score: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    started: bool,
    matches: u32,
    rows_injected: u32,
    events: ArrayVec<SessionEvent, MAX_PENDING_EVENTS>,
}

impl GameSession<SimpleRng> {
    /// Create a session with the default grid and the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::build(SessionConfig::default(), SimpleRng::new(seed))
    }

    /// Get the current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Create a session from an explicit config and random source
    pub fn with_config(config: SessionConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: SessionConfig, rng: R) -> Self {
        Self {
            grid: Grid::new(config.rows, config.cols),
            factory: TileFactory::new(),
            selection: Selection::new(),
            countdown: Countdown::new(config.timed_interval),
            rng,
            mode: SessionMode::TurnBased,
            phase: SessionPhase::Ready,
            target: 0,
            score: 0,
            episode_id: 0,
            started: false,
            matches: 0,
            rows_injected: 0,
            events: ArrayVec::new(),
            config,
        }
    }

    /// Begin a new session, discarding any previous one
    ///
    /// Deals the initial rows, draws the first target and, in timed mode, arms
    /// the countdown.
    pub fn start(&mut self, mode: SessionMode) -> SessionSnapshot {
        if self.started {
            self.episode_id = self.episode_id.wrapping_add(1);
        }
        self.started = true;
        self.clear_board();
        self.mode = mode;

        let bottom = self.grid.bottom_row();
        let cols = self.grid.cols();
        let mut tiles = Vec::with_capacity(self.config.initial_rows as usize * cols as usize);
        for depth in 0..self.config.initial_rows {
            tiles.extend(self.factory.make_row(bottom - depth, cols, &mut self.rng));
        }
        self.grid.replace_all(tiles);
        self.target = generate_target(self.grid.tiles(), &mut self.rng);

        match mode {
            SessionMode::Timed => self.countdown.reset(),
            SessionMode::TurnBased => self.countdown.cancel(),
        }
        self.phase = SessionPhase::Playing;

        info!(
            mode = mode.as_str(),
            episode = self.episode_id,
            target = self.target,
            "session started"
        );
        self.push_event(SessionEvent::Started {
            mode,
            target: self.target,
        });

        self.snapshot()
    }

    /// Select or deselect a tile and classify the selection against the target
    ///
    /// Returns `None` when the toggle is ignored: the session is not playing or
    /// the id does not name a tile on the grid.
    pub fn toggle_tile(&mut self, id: TileId) -> Option<SelectionOutcome> {
        if !self.phase.accepts_input() {
            return None;
        }
        let value = self.grid.tile(id)?.value;

        let outcome = self.selection.toggle(id, value, self.target);
        if let SelectionOutcome::Exact { ids, .. } = &outcome {
            self.resolve(ids);
        }
        Some(outcome)
    }

    /// Advance the timed-mode countdown by one time unit
    ///
    /// Returns true when a row injection was attempted.
    pub fn tick(&mut self) -> bool {
        if self.mode != SessionMode::Timed || !self.phase.accepts_input() {
            return false;
        }
        if self.countdown.tick() {
            self.inject();
            return true;
        }
        false
    }

    /// Suspend play; a pending timed injection is cancelled
    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        self.phase = SessionPhase::Paused;
        self.countdown.cancel();
        self.push_event(SessionEvent::Paused);
        true
    }

    /// Continue a paused session; timed mode restarts a full countdown
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Playing;
        if self.mode == SessionMode::Timed {
            self.countdown.reset();
        }
        self.push_event(SessionEvent::Resumed);
        true
    }

    /// Return to `Ready` with an empty grid
    pub fn reset(&mut self) {
        self.clear_board();
        self.phase = SessionPhase::Ready;
        self.push_event(SessionEvent::Reset);
    }

    /// Apply a bare control command
    pub fn apply_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Tick => self.tick(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(),
            SessionCommand::Reset => {
                self.reset();
                true
            }
        }
    }

    /// Replace the current target without touching the grid
    ///
    /// Meant for scripted scenarios. The in-progress selection is dropped so
    /// it is never classified against a target it was not built for. Ignored
    /// once the game is over.
    pub fn force_target(&mut self, target: u32) -> bool {
        if self.phase == SessionPhase::GameOver {
            return false;
        }
        self.selection.clear();
        self.target = target;
        true
    }

    /// Take and clear the events recorded since the last call.
    pub fn take_events(&mut self) -> ArrayVec<SessionEvent, MAX_PENDING_EVENTS> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn current_target(&self) -> u32 {
        self.target
    }

    pub fn current_grid(&self) -> &[Tile] {
        self.grid.tiles()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selection(&self) -> &[TileId] {
        self.selection.ids()
    }

    pub fn selection_sum(&self) -> u32 {
        self.selection.sum()
    }

    /// Ticks until the next timed injection, `None` when no countdown is armed
    pub fn countdown(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn rows_injected(&self) -> u32 {
        self.rows_injected
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.rows = self.grid.rows();
        out.cols = self.grid.cols();
        out.tiles.clear();
        out.tiles.extend_from_slice(self.grid.tiles());
        out.target = self.target;
        out.selection.clear();
        out.selection.extend_from_slice(self.selection.ids());
        out.selection_sum = self.selection.sum();
        out.score = self.score;
        out.mode = self.mode;
        out.phase = self.phase;
        out.countdown = self.countdown.remaining();
        out.episode_id = self.episode_id;
        out.matches = self.matches;
        out.rows_injected = self.rows_injected;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn resolve(&mut self, ids: &[TileId]) {
        let result = resolve_match(&mut self.grid, ids, &mut self.rng);
        self.score = self.score.saturating_add(result.sum);
        self.target = result.target;
        self.matches += 1;

        debug!(
            sum = result.sum,
            cleared = result.cleared,
            next_target = result.target,
            "match resolved"
        );
        self.push_event(SessionEvent::Matched {
            sum: result.sum,
            cleared: result.cleared,
            target: result.target,
        });

        if self.mode == SessionMode::TurnBased {
            self.inject();
        }
    }

    fn inject(&mut self) -> InjectOutcome {
        let outcome = inject_row(&mut self.grid, &mut self.factory, &mut self.rng);
        match outcome {
            InjectOutcome::Injected => {
                self.rows_injected += 1;
                if self.mode == SessionMode::Timed {
                    self.countdown.reset();
                }
                debug!(tiles = self.grid.len(), "row injected");
                self.push_event(SessionEvent::RowInjected {
                    row: self.grid.bottom_row(),
                });
            }
            InjectOutcome::Overflow => {
                self.phase = SessionPhase::GameOver;
                self.countdown.cancel();
                info!(
                    score = self.score,
                    matches = self.matches,
                    episode = self.episode_id,
                    "game over"
                );
                self.push_event(SessionEvent::Overflow);
            }
        }
        outcome
    }

    fn clear_board(&mut self) {
        self.grid.clear();
        self.selection.clear();
        self.countdown.cancel();
        self.target = 0;
        self.score = 0;
        self.matches = 0;
        self.rows_injected = 0;
    }

    fn push_event(&mut self, event: SessionEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }
        self.events.push(event);
    }
}

impl Default for GameSession<SimpleRng> {
    fn default() -> Self {
        Self::new(1)
    }
}
