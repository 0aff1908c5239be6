//! In-memory content host.

use async_trait::async_trait;
use scene_navigator::{ContentHost, DiscoveredContent, Result};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Default)]
struct HostState {
    loaded: Vec<String>,
    placeholder: bool,
    placeholder_loads: usize,
    discoverable: Option<DiscoveredContent>,
}

/// Tracks which units are loaded and whether the placeholder is up.
#[derive(Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Names of loaded units, placeholder excluded, in load order.
    pub fn loaded(&self) -> Vec<String> {
        self.state.lock().unwrap().loaded.clone()
    }

    pub fn has_placeholder(&self) -> bool {
        self.state.lock().unwrap().placeholder
    }

    /// How many times the placeholder was loaded.
    pub fn placeholder_loads(&self) -> usize {
        self.state.lock().unwrap().placeholder_loads
    }

    /// Offer an already-loaded unit to `initialize`.
    pub fn set_discoverable(&self, discovered: DiscoveredContent) {
        self.state.lock().unwrap().discoverable = Some(discovered);
    }

    pub(crate) fn mark_loaded(&self, name: &str) {
        self.state.lock().unwrap().loaded.push(name.to_string());
    }

    pub(crate) fn mark_unloaded(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state.loaded.iter().position(|n| n == name) {
            state.loaded.remove(pos);
        }
    }
}

#[async_trait]
impl ContentHost for InMemoryHost {
    fn loaded_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.loaded.len() + usize::from(state.placeholder)
    }

    fn find_first_entry_point(&self) -> Option<DiscoveredContent> {
        self.state.lock().unwrap().discoverable.clone()
    }

    async fn load_placeholder(&self, _cancel: CancellationToken) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.placeholder {
            state.placeholder = true;
            state.placeholder_loads += 1;
            debug!("placeholder loaded");
        }
        Ok(())
    }

    async fn unload_placeholder(&self, _cancel: CancellationToken) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.placeholder {
            state.placeholder = false;
            debug!("placeholder unloaded");
        }
        Ok(())
    }
}
