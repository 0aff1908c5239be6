//! Progress reporting.
//!
//! Load and unload report a plain `f32` in `[0, 1]`. The active transition
//! director wants richer data, so the orchestrator threads a
//! [`ProgressDataStore`] snapshot through a [`ProgressFactory`]: each load
//! report is written into the snapshot and the snapshot is forwarded to the
//! director's progress sink.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A sink for progress values.
pub trait Progress<T>: Send + Sync {
    fn report(&self, value: T);
}

impl<T, F> Progress<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn report(&self, value: T) {
        self(value)
    }
}

/// Progress of a single load or unload, `0.0..=1.0`.
pub type LoadProgress = Arc<dyn Progress<f32>>;

/// Progress observed by a transition director.
pub type TransitionProgress = Arc<dyn Progress<ProgressDataStore>>;

struct NoProgress;

impl<T> Progress<T> for NoProgress {
    fn report(&self, _value: T) {}
}

/// A sink that drops every report.
pub fn none<T: 'static>() -> Arc<dyn Progress<T>> {
    Arc::new(NoProgress)
}

/// Adapt a sink of `U` into a sink of `T`.
pub fn convert<T, U, F>(target: Arc<dyn Progress<U>>, selector: F) -> Arc<dyn Progress<T>>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    Arc::new(move |value: T| target.report(selector(value)))
}

/// Load progress payload stored in a [`ProgressDataStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProgressData {
    pub progress: f32,
}

impl LoadProgressData {
    pub fn new(progress: f32) -> Self {
        Self { progress }
    }
}

/// Type-erased snapshot of the latest progress data.
///
/// Clones share the slot, so the director sees every update through the
/// snapshot it was handed.
#[derive(Clone, Default)]
pub struct ProgressDataStore {
    data: Arc<Mutex<Option<Arc<dyn Any + Send + Sync>>>>,
}

impl ProgressDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data<T: Any + Send + Sync>(&self, value: T) {
        *self.data.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(value));
    }

    /// Latest data as `T`, if present and of that type.
    pub fn data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let data = self
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        data.downcast::<T>().ok()
    }
}

impl fmt::Debug for ProgressDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressDataStore")
            .field("load", &self.data::<LoadProgressData>())
            .finish()
    }
}

/// Builds snapshots and the load-progress sinks bound to them.
pub trait ProgressFactory: Send + Sync {
    /// Fresh snapshot for one transition.
    fn create_snapshot(&self) -> ProgressDataStore;

    /// A load sink that updates `snapshot` and forwards it to `target`.
    fn create_progress(
        &self,
        snapshot: ProgressDataStore,
        target: TransitionProgress,
    ) -> LoadProgress;
}

/// Records [`LoadProgressData`] in the snapshot on every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardProgressFactory;

impl ProgressFactory for StandardProgressFactory {
    fn create_snapshot(&self) -> ProgressDataStore {
        let snapshot = ProgressDataStore::new();
        snapshot.set_data(LoadProgressData::new(0.0));
        snapshot
    }

    fn create_progress(
        &self,
        snapshot: ProgressDataStore,
        target: TransitionProgress,
    ) -> LoadProgress {
        Arc::new(move |value: f32| {
            snapshot.set_data(LoadProgressData::new(value));
            target.report(snapshot.clone());
        })
    }
}
