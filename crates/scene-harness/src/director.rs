//! Recording transition director.

use async_trait::async_trait;
use scene_navigator::{
    LoadProgressData, ProgressDataStore, Result, TransitionDirector, TransitionHandle,
};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Log {
    handles: usize,
    starts: usize,
    ends: usize,
    progress: Vec<f32>,
}

/// Counts handles, starts and ends, and keeps every load progress value seen.
#[derive(Debug, Clone, Default)]
pub struct RecordingDirector {
    log: Arc<Mutex<Log>>,
}

impl RecordingDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> usize {
        self.log.lock().unwrap().handles
    }

    pub fn starts(&self) -> usize {
        self.log.lock().unwrap().starts
    }

    pub fn ends(&self) -> usize {
        self.log.lock().unwrap().ends
    }

    pub fn progress(&self) -> Vec<f32> {
        self.log.lock().unwrap().progress.clone()
    }
}

impl TransitionDirector for RecordingDirector {
    fn create_handle(&self) -> Arc<dyn TransitionHandle> {
        self.log.lock().unwrap().handles += 1;
        Arc::new(RecordingHandle {
            log: self.log.clone(),
        })
    }
}

struct RecordingHandle {
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl TransitionHandle for RecordingHandle {
    async fn start(&self, _cancel: CancellationToken) -> Result<()> {
        self.log.lock().unwrap().starts += 1;
        Ok(())
    }

    async fn end(&self, _cancel: CancellationToken) -> Result<()> {
        self.log.lock().unwrap().ends += 1;
        Ok(())
    }

    fn report_progress(&self, progress: &ProgressDataStore) {
        if let Some(load) = progress.data::<LoadProgressData>() {
            self.log.lock().unwrap().progress.push(load.progress);
        }
    }
}
