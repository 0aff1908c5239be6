//! Scripted content units.
//!
//! [`TestContent`] builds a [`ContentId`] whose entry point records every
//! callback and then runs an optional hook. Hooks are where tests call back
//! into the navigator to provoke interrupts.

use crate::host::InMemoryHost;
use crate::recorder::{Callback, LifecycleRecorder};
use async_trait::async_trait;
use futures::future::BoxFuture;
use scene_navigator::{
    ContentHandle, ContentId, ContentIdentifier, DataReader, DataWriter, DiscoveredContent,
    EntryPoint, LoadProgress, LoadedContent, NavigationError, Result, TransitionProgress,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a hook gets to work with.
pub struct HookContext {
    pub name: String,
    /// Set for initialize and enter.
    pub reader: Option<DataReader>,
    /// Set for exit and finalize.
    pub writer: Option<DataWriter>,
    pub cancel: CancellationToken,
}

type Hook = Arc<dyn Fn(HookContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

#[derive(Clone)]
struct Script {
    name: String,
    host: Arc<InMemoryHost>,
    recorder: LifecycleRecorder,
    hooks: HashMap<Callback, Hook>,
    with_entry_point: bool,
    load_failure: Option<String>,
}

/// Builder for a scripted [`ContentId`].
pub struct TestContent {
    script: Script,
}

impl TestContent {
    pub fn new(name: &str, host: &Arc<InMemoryHost>, recorder: &LifecycleRecorder) -> Self {
        Self {
            script: Script {
                name: name.to_string(),
                host: host.clone(),
                recorder: recorder.clone(),
                hooks: HashMap::new(),
                with_entry_point: true,
                load_failure: None,
            },
        }
    }

    /// Run `hook` after the callback has been recorded.
    pub fn on<F, Fut>(mut self, callback: Callback, hook: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let boxed: Hook = Arc::new(move |ctx: HookContext| -> BoxFuture<'static, Result<()>> {
            Box::pin(hook(ctx))
        });
        self.script.hooks.insert(callback, boxed);
        self
    }

    /// Loaded unit exposes no entry point.
    pub fn without_entry_point(mut self) -> Self {
        self.script.with_entry_point = false;
        self
    }

    /// Every load fails with this message.
    pub fn failing_load(mut self, message: &str) -> Self {
        self.script.load_failure = Some(message.to_string());
        self
    }

    pub fn build(self) -> ContentId {
        ContentId::new(self.script)
    }

    /// Load the unit now and describe it as already loaded, for startup adoption.
    pub async fn preload(self) -> Result<DiscoveredContent> {
        let script = self.script.clone();
        let content = self.build();
        let handle = content.create_handle();
        let loaded = handle
            .load(scene_navigator::progress::none(), CancellationToken::new())
            .await?;
        let entry_point = loaded
            .entry_point
            .ok_or_else(|| NavigationError::EntryPointNotFound(script.name.clone()))?;
        Ok(DiscoveredContent {
            content,
            handle,
            entry_point,
        })
    }
}

impl ContentIdentifier for Script {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn create_handle(&self) -> Arc<dyn ContentHandle> {
        Arc::new(TestHandle {
            script: self.clone(),
            loaded: AtomicBool::new(false),
        })
    }
}

struct TestHandle {
    script: Script,
    loaded: AtomicBool,
}

#[async_trait]
impl ContentHandle for TestHandle {
    async fn load(
        &self,
        progress: LoadProgress,
        _cancel: CancellationToken,
    ) -> Result<LoadedContent> {
        if let Some(message) = &self.script.load_failure {
            return Err(NavigationError::collaborator(message));
        }
        if self.loaded.swap(true, Ordering::SeqCst) {
            return Err(NavigationError::AlreadyLoaded(self.script.name.clone()));
        }
        progress.report(0.5);
        tokio::task::yield_now().await;
        self.script.host.mark_loaded(&self.script.name);
        progress.report(1.0);

        let entry_point = self.script.with_entry_point.then(|| {
            Arc::new(TestEntryPoint {
                script: self.script.clone(),
            }) as Arc<dyn EntryPoint>
        });
        Ok(LoadedContent {
            name: self.script.name.clone(),
            entry_point,
        })
    }

    async fn unload(&self, progress: LoadProgress, _cancel: CancellationToken) -> Result<()> {
        if !self.loaded.swap(false, Ordering::SeqCst) {
            return Err(NavigationError::NotLoaded(self.script.name.clone()));
        }
        self.script.host.mark_unloaded(&self.script.name);
        progress.report(1.0);
        Ok(())
    }
}

struct TestEntryPoint {
    script: Script,
}

impl TestEntryPoint {
    async fn run(
        &self,
        callback: Callback,
        reader: Option<DataReader>,
        writer: Option<DataWriter>,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.script.recorder.record(&self.script.name, callback);
        let Some(hook) = self.script.hooks.get(&callback).cloned() else {
            return Ok(());
        };
        hook(HookContext {
            name: self.script.name.clone(),
            reader,
            writer,
            cancel,
        })
        .await
    }
}

#[async_trait]
impl EntryPoint for TestEntryPoint {
    async fn on_first_pre_initialize(
        &self,
        reader: DataReader,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.run(Callback::PreInitialize, Some(reader), None, cancel).await
    }

    async fn on_initialize(
        &self,
        reader: DataReader,
        _progress: TransitionProgress,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.run(Callback::Initialize, Some(reader), None, cancel).await
    }

    async fn on_enter(&self, reader: DataReader, cancel: CancellationToken) -> Result<()> {
        self.run(Callback::Enter, Some(reader), None, cancel).await
    }

    async fn on_exit(&self, writer: DataWriter, cancel: CancellationToken) -> Result<()> {
        self.run(Callback::Exit, None, Some(writer), cancel).await
    }

    async fn on_finalize(
        &self,
        writer: DataWriter,
        _progress: TransitionProgress,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.run(Callback::Finalize, None, Some(writer), cancel).await
    }
}
