//! Content contracts.
//!
//! A navigable unit ("content") is named by a [`ContentIdentifier`], loaded
//! and unloaded through a [`ContentHandle`], and driven through its lifecycle
//! by the [`EntryPoint`] it exposes once loaded. The engine that actually owns
//! loaded units sits behind [`ContentHost`].
//!
//! ```text
//!   ContentId ──create_handle()──► ContentHandle ──load()──► LoadedContent
//!                                                               │
//!                                                               ▼
//!                                    EntryPoint: initialize → enter → exit → finalize
//! ```

use crate::data_store::{ContentData, DataReader, DataWriter};
use crate::progress::{LoadProgress, TransitionProgress};
use crate::Result;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Names a loadable unit and mints handles for it.
pub trait ContentIdentifier: Send + Sync {
    /// Human-readable name, used in logs and errors.
    fn name(&self) -> String;

    /// A fresh handle. Each call returns a new handle.
    fn create_handle(&self) -> Arc<dyn ContentHandle>;
}

/// Shared, cheaply cloneable identifier.
///
/// Equality is identity: two ids are equal only when they wrap the same
/// identifier instance.
#[derive(Clone)]
pub struct ContentId(Arc<dyn ContentIdentifier>);

impl ContentId {
    pub fn new(identifier: impl ContentIdentifier + 'static) -> Self {
        Self(Arc::new(identifier))
    }

    pub fn from_arc(identifier: Arc<dyn ContentIdentifier>) -> Self {
        Self(identifier)
    }

    pub fn name(&self) -> String {
        self.0.name()
    }

    pub fn create_handle(&self) -> Arc<dyn ContentHandle> {
        self.0.create_handle()
    }
}

impl PartialEq for ContentId {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl Eq for ContentId {}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentId").field(&self.name()).finish()
    }
}

/// A [`ContentId`] whose entry point expects a payload of type `T`.
pub struct TypedContentId<T> {
    id: ContentId,
    _data: PhantomData<fn(T)>,
}

impl<T: Any + Send + Sync> TypedContentId<T> {
    pub fn new(id: ContentId) -> Self {
        Self {
            id,
            _data: PhantomData,
        }
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    /// Erase the payload for a request.
    pub fn payload(&self, data: T) -> ContentData {
        Arc::new(data)
    }
}

impl<T> Clone for TypedContentId<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            _data: PhantomData,
        }
    }
}

/// Result of a successful load.
#[derive(Clone)]
pub struct LoadedContent {
    pub name: String,
    pub entry_point: Option<Arc<dyn EntryPoint>>,
}

/// Loads and unloads one instance of a content unit.
#[async_trait]
pub trait ContentHandle: Send + Sync {
    /// Load the unit. Fails with `AlreadyLoaded` if called twice.
    async fn load(
        &self,
        progress: LoadProgress,
        cancel: CancellationToken,
    ) -> Result<LoadedContent>;

    /// Unload the unit. Fails with `NotLoaded` if not loaded.
    async fn unload(&self, progress: LoadProgress, cancel: CancellationToken) -> Result<()>;
}

/// Lifecycle callbacks of a loaded unit.
///
/// All callbacks default to no-ops. Any callback may itself invoke a
/// navigator verb; the orchestrator treats that as an interrupt.
#[async_trait]
pub trait EntryPoint: Send + Sync {
    /// Only called when adopting an already-loaded unit and the navigator is
    /// configured to do so.
    async fn on_first_pre_initialize(
        &self,
        _reader: DataReader,
        _cancel: CancellationToken,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_initialize(
        &self,
        _reader: DataReader,
        _progress: TransitionProgress,
        _cancel: CancellationToken,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_enter(&self, _reader: DataReader, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }

    async fn on_exit(&self, _writer: DataWriter, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }

    async fn on_finalize(
        &self,
        _writer: DataWriter,
        _progress: TransitionProgress,
        _cancel: CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}

/// A unit found already loaded by the host.
#[derive(Clone)]
pub struct DiscoveredContent {
    pub content: ContentId,
    /// Handle that unloads the unit when navigation leaves it.
    pub handle: Arc<dyn ContentHandle>,
    pub entry_point: Arc<dyn EntryPoint>,
}

/// The engine owning loaded units.
#[async_trait]
pub trait ContentHost: Send + Sync {
    /// Number of currently loaded units, placeholder included.
    fn loaded_count(&self) -> usize;

    /// First entry point among already-loaded units, if any. Hosts with
    /// several candidates report the extras themselves and return the first.
    fn find_first_entry_point(&self) -> Option<DiscoveredContent>;

    /// Load the empty unit that keeps the engine from dropping to zero units.
    async fn load_placeholder(&self, cancel: CancellationToken) -> Result<()>;

    /// Unload the placeholder. No-op when absent.
    async fn unload_placeholder(&self, cancel: CancellationToken) -> Result<()>;
}

/// Host with nothing to discover and no placeholder to manage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

#[async_trait]
impl ContentHost for DetachedHost {
    fn loaded_count(&self) -> usize {
        0
    }

    fn find_first_entry_point(&self) -> Option<DiscoveredContent> {
        None
    }

    async fn load_placeholder(&self, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }

    async fn unload_placeholder(&self, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    struct NoopHandle;

    #[async_trait]
    impl ContentHandle for NoopHandle {
        async fn load(
            &self,
            _progress: LoadProgress,
            _cancel: CancellationToken,
        ) -> Result<LoadedContent> {
            Ok(LoadedContent {
                name: "noop".into(),
                entry_point: None,
            })
        }

        async fn unload(&self, _progress: LoadProgress, _cancel: CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    impl ContentIdentifier for Named {
        fn name(&self) -> String {
            self.0.to_string()
        }

        fn create_handle(&self) -> Arc<dyn ContentHandle> {
            Arc::new(NoopHandle)
        }
    }

    #[test]
    fn test_identity_equality() {
        let a = ContentId::new(Named("menu"));
        let b = ContentId::new(Named("menu"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "menu");
    }

    #[test]
    fn test_typed_id_payload() {
        let typed = TypedContentId::<u32>::new(ContentId::new(Named("level")));
        let data = typed.payload(3);
        assert_eq!(*data.downcast::<u32>().unwrap(), 3);
        assert_eq!(typed.clone().id(), typed.id());
    }

    #[tokio::test]
    async fn test_detached_host_is_inert() {
        let host = DetachedHost;
        assert_eq!(host.loaded_count(), 0);
        assert!(host.find_first_entry_point().is_none());
        host.load_placeholder(CancellationToken::new()).await.unwrap();
        host.unload_placeholder(CancellationToken::new()).await.unwrap();
    }
}
