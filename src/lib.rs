//! Sumfall (workspace facade crate).
//!
//! Re-exports the workspace crates under one `sumfall::{core,adapter,types}`
//! path while the implementation lives in dedicated crates under `crates/`.

pub use sumfall_adapter as adapter;
pub use sumfall_core as core;
pub use sumfall_types as types;
