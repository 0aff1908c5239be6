//! Transition directors.
//!
//! A [`TransitionDirector`] decides what the user sees while content is being
//! swapped (a fade, a loading screen). Each navigation mints one
//! [`TransitionHandle`] from it: `start` runs before the old content is torn
//! down and `end` runs once the new content has initialized.

use crate::progress::{Progress, ProgressDataStore, TransitionProgress};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Mints transition handles.
pub trait TransitionDirector: Send + Sync {
    fn create_handle(&self) -> Arc<dyn TransitionHandle>;
}

/// One running transition.
#[async_trait]
pub trait TransitionHandle: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> Result<()>;

    async fn end(&self, cancel: CancellationToken) -> Result<()>;

    /// Progress updates while the transition runs. Ignored by default.
    fn report_progress(&self, _progress: &ProgressDataStore) {}
}

struct EmptyDirector;

struct EmptyHandle;

impl TransitionDirector for EmptyDirector {
    fn create_handle(&self) -> Arc<dyn TransitionHandle> {
        Arc::new(EmptyHandle)
    }
}

#[async_trait]
impl TransitionHandle for EmptyHandle {
    async fn start(&self, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }

    async fn end(&self, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }
}

/// A director whose transitions do nothing.
pub fn empty() -> Arc<dyn TransitionDirector> {
    Arc::new(EmptyDirector)
}

struct HandleProgress(Arc<dyn TransitionHandle>);

impl Progress<ProgressDataStore> for HandleProgress {
    fn report(&self, value: ProgressDataStore) {
        self.0.report_progress(&value);
    }
}

/// The transition that is currently running.
///
/// Shared by every verb nested inside one top-level navigation: only the
/// first verb starts it and only the one that completes its enter sequence
/// ends it.
#[derive(Clone)]
pub struct TransitionRunState {
    pub handle: Arc<dyn TransitionHandle>,
    pub progress: TransitionProgress,
}

impl TransitionRunState {
    pub fn new(director: &dyn TransitionDirector) -> Self {
        let handle = director.create_handle();
        let progress: TransitionProgress = Arc::new(HandleProgress(handle.clone()));
        Self { handle, progress }
    }
}
