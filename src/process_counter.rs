//! Process counter.
//!
//! Tracks how many verb calls are in flight (nested interrupts count
//! separately) and a monotonically increasing version bumped on every call.
//! The history builder uses the pair to detect that navigation moved on
//! underneath it.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counts {
    depth: AtomicUsize,
    version: AtomicU64,
}

/// Shared counter; clones observe the same counts.
#[derive(Debug, Clone, Default)]
pub struct ProcessCounter {
    counts: Arc<Counts>,
}

impl ProcessCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a verb call in flight until the returned scope is dropped.
    #[must_use = "the call is only counted while the scope is alive"]
    pub fn enter(&self) -> ProcessScope {
        self.counts.depth.fetch_add(1, Ordering::SeqCst);
        self.counts.version.fetch_add(1, Ordering::SeqCst);
        ProcessScope {
            counts: self.counts.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.depth() > 0
    }

    pub fn depth(&self) -> usize {
        self.counts.depth.load(Ordering::SeqCst)
    }

    pub fn version(&self) -> u64 {
        self.counts.version.load(Ordering::SeqCst)
    }
}

/// Guard returned by [`ProcessCounter::enter`].
#[derive(Debug)]
pub struct ProcessScope {
    counts: Arc<Counts>,
}

impl Drop for ProcessScope {
    fn drop(&mut self) {
        self.counts.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
