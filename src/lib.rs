//! Stack-based navigation between loadable content units.
//!
//! This crate provides:
//!
//! - **History**: a stack of entries, each remembering its content, transition
//!   director and a data slot that survives leaving and returning
//! - **StandardNavigator**: the orchestrator behind push, pop, change, replace
//!   and reload, driving each unit through initialize, enter, exit and finalize
//! - **Interrupts**: any verb called while another is suspended supersedes it
//!   through cooperative cancellation
//! - **HistoryBuilder**: rewrites history without loading anything
//!
//! # Architecture
//!
//! ```text
//!   caller / entry point / interrupt
//!                │
//!                ▼
//!        SceneNavigator ◄── GlobalNavigator (process-wide forwarder)
//!                │
//!                ▼
//!      StandardNavigator ──► ProcessCounter ──► HistoryBuilder
//!                │
//!      ┌─────────┼──────────────┬────────────────────┐
//!      ▼         ▼              ▼                    ▼
//!   History  ContentHost  TransitionDirector   ProgressFactory
//! ```
//!
//! # Example
//!
//! ```ignore
//! use scene_navigator::{LoadRequest, SceneNavigator, StandardNavigator};
//! use tokio_util::sync::CancellationToken;
//!
//! let nav = StandardNavigator::new(host);
//! nav.initialize().await?;
//! nav.push(LoadRequest::new(title_screen), CancellationToken::new()).await?;
//! ```

pub mod config;
pub mod content;
pub mod data_store;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod navigator;
pub mod operation;
pub mod process_counter;
pub mod progress;
pub mod transition;

pub use config::NavigatorConfig;
pub use content::{
    ContentHandle, ContentHost, ContentId, ContentIdentifier, DetachedHost, DiscoveredContent,
    EntryPoint, LoadedContent, TypedContentId,
};
pub use data_store::{ContentData, DataReader, DataStore, DataWriter};
pub use error::{NavigationError, Result};
pub use history::{History, HistoryEntry};
pub use navigator::{
    global, EntryStage, GlobalNavigator, HistoryBuilder, LoadRequest, NavigationVerb, PopRequest,
    ReloadRequest, ReturnRequest, SceneNavigator, SceneNavigatorExt, StandardNavigator,
};
pub use operation::AsyncOperation;
pub use process_counter::{ProcessCounter, ProcessScope};
pub use progress::{
    LoadProgress, LoadProgressData, Progress, ProgressDataStore, ProgressFactory,
    StandardProgressFactory, TransitionProgress,
};
pub use transition::{TransitionDirector, TransitionHandle, TransitionRunState};

/// Re-exported so callers need not depend on `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
