//! Navigator surface.
//!
//! [`SceneNavigator`] is what callers (and entry points, for interrupts) talk
//! to. [`StandardNavigator`] is the orchestrator behind it and
//! [`GlobalNavigator`] a thin process-wide forwarder.

mod builder;
mod singleton;
mod standard;

pub use builder::HistoryBuilder;
pub use singleton::{global, GlobalNavigator};
pub use standard::StandardNavigator;

use crate::content::{ContentId, TypedContentId};
use crate::data_store::ContentData;
use crate::history::HistoryEntry;
use crate::operation::AsyncOperation;
use crate::transition::TransitionDirector;
use crate::{NavigationError, Result};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The five navigation verbs, plus startup adoption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationVerb {
    Push,
    Pop,
    Change,
    Replace,
    Reload,
    Adopt,
}

impl NavigationVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationVerb::Push => "Push",
            NavigationVerb::Pop => "Pop",
            NavigationVerb::Change => "Change",
            NavigationVerb::Replace => "Replace",
            NavigationVerb::Reload => "Reload",
            NavigationVerb::Adopt => "Adopt",
        }
    }
}

impl fmt::Display for NavigationVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request for push, change and replace.
#[derive(Clone)]
pub struct LoadRequest {
    pub content: ContentId,
    /// Director for this transition; the navigator default when `None`.
    pub director: Option<Arc<dyn TransitionDirector>>,
    pub data: Option<ContentData>,
    pub interrupt: Option<Arc<dyn AsyncOperation>>,
}

impl LoadRequest {
    pub fn new(content: ContentId) -> Self {
        Self {
            content,
            director: None,
            data: None,
            interrupt: None,
        }
    }

    /// Request for a typed identifier with its payload.
    pub fn typed<T: Any + Send + Sync>(content: &TypedContentId<T>, data: T) -> Self {
        Self::new(content.id().clone()).with_data(content.payload(data))
    }

    pub fn with_director(mut self, director: Arc<dyn TransitionDirector>) -> Self {
        self.director = Some(director);
        self
    }

    pub fn with_data(mut self, data: ContentData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_interrupt(mut self, interrupt: Arc<dyn AsyncOperation>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("content", &self.content)
            .field("has_director", &self.director.is_some())
            .field("has_data", &self.data.is_some())
            .field("has_interrupt", &self.interrupt.is_some())
            .finish()
    }
}

/// Request for pop and reload.
///
/// Without an override the director stored on the entry being left is used.
#[derive(Clone, Default)]
pub struct ReturnRequest {
    pub override_director: Option<Arc<dyn TransitionDirector>>,
    pub interrupt: Option<Arc<dyn AsyncOperation>>,
}

pub type PopRequest = ReturnRequest;
pub type ReloadRequest = ReturnRequest;

impl ReturnRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_director(mut self, director: Arc<dyn TransitionDirector>) -> Self {
        self.override_director = Some(director);
        self
    }

    pub fn with_interrupt(mut self, interrupt: Arc<dyn AsyncOperation>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
}

impl fmt::Debug for ReturnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnRequest")
            .field("has_override_director", &self.override_director.is_some())
            .field("has_interrupt", &self.interrupt.is_some())
            .finish()
    }
}

/// Navigation surface.
///
/// Verbs are re-entrant: calling one while another is suspended cancels the
/// older one, which then fails with [`NavigationError::Canceled`] at its next
/// checkpoint.
#[async_trait]
pub trait SceneNavigator: Send + Sync {
    /// Adopt an already-loaded unit, if the host has one. Call once.
    async fn initialize(&self) -> Result<()>;

    /// History from top (current) to bottom.
    fn history(&self) -> Vec<HistoryEntry>;

    async fn push(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()>;

    async fn pop(&self, request: PopRequest, cancel: CancellationToken) -> Result<()>;

    async fn change(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()>;

    async fn replace(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()>;

    async fn reload(&self, request: ReloadRequest, cancel: CancellationToken) -> Result<()>;

    /// Rewrite history without loading anything. Fails while a verb runs.
    fn history_builder_unsafe(&self) -> Result<HistoryBuilder> {
        Err(NavigationError::Unsupported("history_builder_unsafe"))
    }

    /// Cancel in-flight work and drop all state. Idempotent.
    fn dispose(&self) {}
}

/// Helpers available on every navigator.
pub trait SceneNavigatorExt: SceneNavigator {
    /// True when pop would not be rejected up front.
    fn can_pop(&self) -> bool {
        self.history().len() > 1
    }
}

impl<N: SceneNavigator + ?Sized> SceneNavigatorExt for N {}

/// How far the current verb got into its enter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryStage {
    PreInitializing,
    Initializing,
    Entering,
}
