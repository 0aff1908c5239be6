//! History builder.
//!
//! Rewrites the history stack without loading anything. The builder works on
//! a copy (index 0 is the current entry and cannot be touched) and commits
//! only if no verb ran since it was taken.

use super::standard::{lock_state, SharedState};
use crate::history::HistoryEntry;
use crate::process_counter::ProcessCounter;
use crate::{NavigationError, Result};
use tracing::info;

pub struct HistoryBuilder {
    state: SharedState,
    counter: ProcessCounter,
    version: u64,
    /// Top to bottom.
    entries: Vec<HistoryEntry>,
}

impl HistoryBuilder {
    pub(super) fn new(state: SharedState, counter: ProcessCounter) -> Self {
        let entries = lock_state(&state).history.iter().cloned().collect();
        let version = counter.version();
        Self {
            state,
            counter,
            version,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Working copy, top to bottom.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Process counter version captured when the builder was taken.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn editable(&self, index: usize, len: usize) -> Result<()> {
        if index == 0 || index >= len {
            return Err(NavigationError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Overwrite the entry at `index` (1..len).
    pub fn set(&mut self, index: usize, entry: HistoryEntry) -> Result<&mut Self> {
        self.editable(index, self.entries.len())?;
        self.entries[index] = entry;
        Ok(self)
    }

    /// Append at the bottom.
    pub fn add(&mut self, entry: HistoryEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Insert before `index` (1..=len).
    pub fn insert(&mut self, index: usize, entry: HistoryEntry) -> Result<&mut Self> {
        self.editable(index, self.entries.len() + 1)?;
        self.entries.insert(index, entry);
        Ok(self)
    }

    /// Remove the entry at `index` (1..len).
    pub fn remove_at(&mut self, index: usize) -> Result<&mut Self> {
        self.editable(index, self.entries.len())?;
        self.entries.remove(index);
        Ok(self)
    }

    pub fn remove_all_except_current(&mut self) -> &mut Self {
        self.entries.truncate(1);
        self
    }

    /// Commit the working copy as the navigator's history.
    pub fn build(self) -> Result<()> {
        if self.counter.is_busy() {
            return Err(NavigationError::Busy);
        }
        let current = self.counter.version();
        if current != self.version {
            return Err(NavigationError::VersionConflict {
                captured: self.version,
                current,
            });
        }

        let mut state = lock_state(&self.state);
        if state.active.is_none() {
            return Err(NavigationError::NoActiveContent);
        }
        state.history.clear();
        for entry in self.entries.into_iter().rev() {
            state.history.push(entry);
        }
        info!(depth = state.history.len(), "history rebuilt");
        Ok(())
    }
}
