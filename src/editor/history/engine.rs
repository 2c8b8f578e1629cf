//! The history engine resource.

use std::fmt;

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::map::{FeatureChange, FeatureStore, FeatureSubscription, StoreError};

use super::entry::HistoryEntry;
use super::stack::BoundedStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDirection {
    Undo,
    Redo,
}

impl fmt::Display for ReplayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayDirection::Undo => write!(f, "undo"),
            ReplayDirection::Redo => write!(f, "redo"),
        }
    }
}

/// A replay that the store rejected. The entry is back on the stack it came from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not {direction} {description}: {source}")]
pub struct ReplayError {
    pub direction: ReplayDirection,
    pub description: String,
    #[source]
    pub source: StoreError,
}

/// Result of an undo or redo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// The entry was replayed; carries its description.
    Applied(String),
    /// The stack was empty.
    NothingToDo,
}

/// Undo/redo stacks fed by a Feature Store subscription.
#[derive(Resource)]
pub struct HistoryEngine {
    undo_stack: BoundedStack<HistoryEntry>,
    redo_stack: BoundedStack<HistoryEntry>,
    subscription: FeatureSubscription,
}

impl HistoryEngine {
    /// Subscribe to `store` and start with empty stacks bounded by `capacity`.
    pub fn new(store: &mut FeatureStore, capacity: usize) -> Self {
        Self {
            undo_stack: BoundedStack::new(capacity),
            redo_stack: BoundedStack::new(capacity),
            subscription: store.subscribe(),
        }
    }

    /// Record every pending store notification, in mutation order.
    pub fn capture(&mut self) -> usize {
        let changes = self.subscription.drain();
        let count = changes.len();
        for change in changes {
            self.record(change);
        }
        count
    }

    /// Record one externally observed mutation.
    pub fn record(&mut self, change: FeatureChange) {
        self.record_entry(HistoryEntry::new(change, Utc::now()));
    }

    pub fn record_entry(&mut self, entry: HistoryEntry) {
        debug!(
            "History: recorded {} of {}",
            entry.action_name(),
            entry.change().feature_id()
        );
        self.redo_stack.clear();
        if let Some(evicted) = self.undo_stack.push(entry) {
            debug!("History: evicted oldest {}", evicted.action_name());
        }
    }

    pub fn undo(&mut self, store: &mut FeatureStore) -> Result<HistoryOutcome, ReplayError> {
        self.replay(store, ReplayDirection::Undo)
    }

    pub fn redo(&mut self, store: &mut FeatureStore) -> Result<HistoryOutcome, ReplayError> {
        self.replay(store, ReplayDirection::Redo)
    }

    fn replay(
        &mut self,
        store: &mut FeatureStore,
        direction: ReplayDirection,
    ) -> Result<HistoryOutcome, ReplayError> {
        // Changes made since the last capture belong before anything replayed now
        self.capture();

        let (from, to) = match direction {
            ReplayDirection::Undo => (&mut self.undo_stack, &mut self.redo_stack),
            ReplayDirection::Redo => (&mut self.redo_stack, &mut self.undo_stack),
        };
        let Some(entry) = from.pop() else {
            return Ok(HistoryOutcome::NothingToDo);
        };
        let description = entry.describe();

        let result = {
            let _guard = self.subscription.suppress();
            match direction {
                ReplayDirection::Undo => entry.apply_inverse(store),
                ReplayDirection::Redo => entry.apply_forward(store),
            }
        };

        match result {
            Ok(()) => {
                info!("History: {} {}", direction, description);
                to.push(entry);
                Ok(HistoryOutcome::Applied(description))
            }
            Err(source) => {
                error!("History: {} of {} failed: {}", direction, description, source);
                from.push(entry);
                Err(ReplayError {
                    direction,
                    description,
                    source,
                })
            }
        }
    }

    pub fn peek_undo_description_at(&self, now: DateTime<Utc>) -> String {
        match self.undo_stack.peek() {
            Some(entry) => format!("Undo {}", entry.describe_at(now)),
            None => "Nothing to undo".to_string(),
        }
    }

    pub fn peek_redo_description_at(&self, now: DateTime<Utc>) -> String {
        match self.redo_stack.peek() {
            Some(entry) => format!("Redo {}", entry.describe_at(now)),
            None => "Nothing to redo".to_string(),
        }
    }

    /// e.g. `Undo deletion (3m ago)` or `Nothing to undo`
    pub fn peek_undo_description(&self) -> String {
        self.peek_undo_description_at(Utc::now())
    }

    pub fn peek_redo_description(&self) -> String {
        self.peek_redo_description_at(Utc::now())
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.undo_stack.set_capacity(capacity);
        self.redo_stack.set_capacity(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.undo_stack.capacity()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo entries from oldest to newest.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter()
    }

    /// Drop both stacks and any notifications not yet captured.
    pub fn clear(&mut self) {
        self.subscription.drain();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
