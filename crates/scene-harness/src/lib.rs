//! Scene navigator test harness.
//!
//! In-memory collaborators for driving a `StandardNavigator` without an
//! engine: a host that tracks loaded units and the placeholder, scripted
//! content whose entry points record their callbacks, and a director that
//! counts transitions.

mod content;
mod director;
mod host;
mod recorder;

pub use content::{HookContext, TestContent};
pub use director::RecordingDirector;
pub use host::InMemoryHost;
pub use recorder::{Callback, LifecycleFlags, LifecycleRecorder};

use scene_navigator::{SceneNavigator, StandardNavigator};
use std::sync::Arc;

/// Initialized navigator over a fresh host.
pub async fn navigator() -> (Arc<StandardNavigator>, Arc<InMemoryHost>) {
    let host = InMemoryHost::new();
    let nav = Arc::new(StandardNavigator::new(host.clone()));
    nav.initialize()
        .await
        .unwrap_or_else(|e| panic!("navigator failed to initialize: {e}"));
    (nav, host)
}

/// Content names in history, top first.
pub fn history_names(nav: &dyn SceneNavigator) -> Vec<String> {
    nav.history().iter().map(|entry| entry.content().name()).collect()
}
