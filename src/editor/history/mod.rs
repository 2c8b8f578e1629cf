//! Undo/redo over Feature Store mutations.
//!
//! The [`HistoryEngine`] subscribes to the [`FeatureStore`](crate::map::FeatureStore)
//! and turns every observed mutation into an immutable [`HistoryEntry`]. Undo and
//! redo replay entries back onto the store while the engine's own subscription is
//! suppressed, so replays never record themselves.
//!
//! ## Usage
//!
//! - **Ctrl+Z** (Cmd+Z on macOS): Undo the last change
//! - **Ctrl+Shift+Z**: Redo the last undone change
//!
//! ## Module Structure
//!
//! - [`entry`] - HistoryEntry and its replay in both directions
//! - [`stack`] - Bounded LIFO stack with oldest-first eviction
//! - [`engine`] - HistoryEngine resource
//! - [`systems`] - Bevy systems for capture, shortcuts and requests

mod engine;
mod entry;
mod stack;
mod systems;

#[cfg(test)]
mod tests;

pub use engine::{HistoryEngine, HistoryOutcome, ReplayDirection, ReplayError};
pub use entry::HistoryEntry;
pub use systems::{
    apply_history_requests, capture_feature_changes, handle_history_shortcuts,
    init_history_engine, HistoryRequest,
};
