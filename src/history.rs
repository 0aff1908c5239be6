//! Navigation history.
//!
//! The history is a stack of [`HistoryEntry`] values. The top entry always
//! describes the current (or about-to-be-current) content; entries below it
//! are where `pop` goes back to.

use crate::content::ContentId;
use crate::data_store::{DataReader, DataStore};
use crate::transition::TransitionDirector;
use crate::{NavigationError, Result};
use std::fmt;
use std::sync::Arc;

/// One step of navigation history.
#[derive(Clone)]
pub struct HistoryEntry {
    content: ContentId,
    director: Arc<dyn TransitionDirector>,
    data: DataStore,
}

impl HistoryEntry {
    pub fn new(content: ContentId, director: Arc<dyn TransitionDirector>, data: DataStore) -> Self {
        Self {
            content,
            director,
            data,
        }
    }

    /// Content this entry navigates to.
    pub fn content(&self) -> &ContentId {
        &self.content
    }

    /// Director used when navigating back onto or reloading this entry.
    pub fn director(&self) -> &Arc<dyn TransitionDirector> {
        &self.director
    }

    pub fn data_store(&self) -> &DataStore {
        &self.data
    }

    pub fn reader(&self) -> DataReader {
        self.data.reader()
    }
}

impl fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("content", &self.content)
            .field("data", &self.data)
            .finish()
    }
}

/// Last-in, first-out stack.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: Vec<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove the top item. Fails with `EmptyHistory` on an empty stack.
    pub fn pop(&mut self) -> Result<T> {
        self.items.pop().ok_or(NavigationError::EmptyHistory)
    }

    /// Top item. Fails with `EmptyHistory` on an empty stack.
    pub fn peek(&self) -> Result<&T> {
        self.items.last().ok_or(NavigationError::EmptyHistory)
    }

    pub fn try_pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn try_peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() {
        let mut history = History::with_capacity(4);
        history.push(1);
        history.push(2);
        history.push(3);
        assert_eq!(history.len(), 3);
        assert_eq!(*history.peek().unwrap(), 3);
        assert_eq!(history.pop().unwrap(), 3);
        assert_eq!(history.pop().unwrap(), 2);
        assert_eq!(history.try_peek(), Some(&1));
    }

    #[test]
    fn test_empty_fails() {
        let mut history: History<u8> = History::new();
        assert!(matches!(history.pop(), Err(NavigationError::EmptyHistory)));
        assert!(matches!(history.peek(), Err(NavigationError::EmptyHistory)));
        assert!(history.try_pop().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_iter_top_to_bottom() {
        let mut history = History::new();
        for i in 0..4 {
            history.push(i);
        }
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        history.clear();
        assert_eq!(history.iter().count(), 0);
    }
}
