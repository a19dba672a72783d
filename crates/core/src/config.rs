//! Session configuration
//!
//! Defaults come from `sumfall_types`; environment variables can override them.
//! A config is only ever checked when a session is built, so a bad value fails
//! fast at construction and never mid-game.

use thiserror::Error;

use crate::types::{COLS, INITIAL_ROWS, ROWS, TIMED_MODE_INTERVAL};

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must have at least one row")]
    NoRows,
    #[error("grid must have at least one column")]
    NoColumns,
    #[error("at least one initial row is required")]
    NoInitialRows,
    #[error("initial rows ({initial_rows}) exceed grid height ({rows})")]
    InitialRowsExceedHeight { initial_rows: u8, rows: u8 },
    #[error("timed interval must be positive")]
    ZeroInterval,
}

/// Grid shape and pacing for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub rows: u8,
    pub cols: u8,
    pub initial_rows: u8,
    /// Time units between row injections in timed mode
    pub timed_interval: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: ROWS,
            cols: COLS,
            initial_rows: INITIAL_ROWS,
            timed_interval: TIMED_MODE_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    ///
    /// Missing or unparsable values keep their defaults; range checks happen in
    /// [`SessionConfig::validate`].
    pub fn from_env() -> Self {
        use std::env;

        fn var<T: std::str::FromStr>(key: &str) -> Option<T> {
            env::var(key).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            rows: var("SUMFALL_ROWS").unwrap_or(defaults.rows),
            cols: var("SUMFALL_COLS").unwrap_or(defaults.cols),
            initial_rows: var("SUMFALL_INITIAL_ROWS").unwrap_or(defaults.initial_rows),
            timed_interval: var("SUMFALL_TIMED_INTERVAL").unwrap_or(defaults.timed_interval),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.cols == 0 {
            return Err(ConfigError::NoColumns);
        }
        if self.initial_rows == 0 {
            return Err(ConfigError::NoInitialRows);
        }
        if self.initial_rows > self.rows {
            return Err(ConfigError::InitialRowsExceedHeight {
                initial_rows: self.initial_rows,
                rows: self.rows,
            });
        }
        if self.timed_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}
