//! Process-wide navigator.
//!
//! [`GlobalNavigator`] forwards every call to one registered inner navigator.
//! Registration closes when the wrapper starts; if nothing was registered by
//! then, a [`StandardNavigator`] over a [`DetachedHost`] is used.

use super::{
    HistoryBuilder, LoadRequest, PopRequest, ReloadRequest, SceneNavigator, StandardNavigator,
};
use crate::content::DetachedHost;
use crate::history::HistoryEntry;
use crate::{NavigationError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Default)]
pub struct GlobalNavigator {
    inner: RwLock<Option<Arc<dyn SceneNavigator>>>,
    started: AtomicBool,
}

impl GlobalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the navigator calls are forwarded to. Only before [`start`](Self::start).
    pub fn register(&self, navigator: Arc<dyn SceneNavigator>) -> Result<()> {
        if self.started.load(Ordering::SeqCst) {
            return Err(NavigationError::RegistrationClosed);
        }
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(navigator);
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Close registration and initialize the inner navigator.
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(NavigationError::AlreadyInitialized);
        }
        let inner = {
            let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| {
                info!("no navigator registered, using a detached standard navigator");
                Arc::new(StandardNavigator::new(Arc::new(DetachedHost))) as Arc<dyn SceneNavigator>
            })
            .clone()
        };
        inner.initialize().await
    }

    /// Dispose and drop the inner navigator.
    pub fn shutdown(&self) {
        let inner = self.inner.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(inner) = inner {
            inner.dispose();
        }
    }

    fn inner(&self) -> Result<Arc<dyn SceneNavigator>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(NavigationError::NotRegistered)
    }
}

#[async_trait]
impl SceneNavigator for GlobalNavigator {
    async fn initialize(&self) -> Result<()> {
        self.start().await
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.inner().map(|inner| inner.history()).unwrap_or_default()
    }

    async fn push(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.inner()?.push(request, cancel).await
    }

    async fn pop(&self, request: PopRequest, cancel: CancellationToken) -> Result<()> {
        self.inner()?.pop(request, cancel).await
    }

    async fn change(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.inner()?.change(request, cancel).await
    }

    async fn replace(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.inner()?.replace(request, cancel).await
    }

    async fn reload(&self, request: ReloadRequest, cancel: CancellationToken) -> Result<()> {
        self.inner()?.reload(request, cancel).await
    }

    fn history_builder_unsafe(&self) -> Result<HistoryBuilder> {
        self.inner()?.history_builder_unsafe()
    }

    fn dispose(&self) {
        self.shutdown();
    }
}

/// The process-wide instance.
pub fn global() -> &'static GlobalNavigator {
    static GLOBAL: OnceLock<GlobalNavigator> = OnceLock::new();
    GLOBAL.get_or_init(GlobalNavigator::new)
}
