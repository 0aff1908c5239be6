//! Lifecycle recording.

use bitflags::bitflags;
use std::sync::{Arc, Mutex};

/// One entry point callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    PreInitialize,
    Initialize,
    Enter,
    Exit,
    Finalize,
}

impl Callback {
    fn flag(self) -> LifecycleFlags {
        match self {
            Callback::PreInitialize => LifecycleFlags::PRE_INITIALIZE,
            Callback::Initialize => LifecycleFlags::INITIALIZE,
            Callback::Enter => LifecycleFlags::ENTER,
            Callback::Exit => LifecycleFlags::EXIT,
            Callback::Finalize => LifecycleFlags::FINALIZE,
        }
    }
}

bitflags! {
    /// Which callbacks a content unit has received.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LifecycleFlags: u8 {
        const NONE = 0;
        const INITIALIZE = 1 << 0;
        const ENTER = 1 << 1;
        const EXIT = 1 << 2;
        const FINALIZE = 1 << 3;
        const PRE_INITIALIZE = 1 << 4;

        /// Initialize, enter, exit and finalize.
        const ALL = Self::INITIALIZE.bits()
            | Self::ENTER.bits()
            | Self::EXIT.bits()
            | Self::FINALIZE.bits();
    }
}

/// Ordered log of `(content name, callback)` shared by every content it is attached to.
#[derive(Debug, Clone, Default)]
pub struct LifecycleRecorder {
    events: Arc<Mutex<Vec<(String, Callback)>>>,
}

impl LifecycleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, callback: Callback) {
        self.events.lock().unwrap().push((name.to_string(), callback));
    }

    pub fn events(&self) -> Vec<(String, Callback)> {
        self.events.lock().unwrap().clone()
    }

    /// Events as `"name:Callback"` strings, handy in assertions.
    pub fn sequence(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|(name, callback)| format!("{name}:{callback:?}"))
            .collect()
    }

    pub fn flags(&self, name: &str) -> LifecycleFlags {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .fold(LifecycleFlags::NONE, |acc, (_, callback)| acc | callback.flag())
    }

    pub fn count(&self, name: &str, callback: Callback) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, c)| n == name && *c == callback)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
