//! Per-entry data slot.
//!
//! Each history entry owns one [`DataStore`]. The entry point of the content
//! reads it during `on_initialize` / `on_enter` and may write to it during
//! `on_exit` / `on_finalize`, so state survives a pop or reload back onto
//! the same entry.

use crate::{NavigationError, Result};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Type-erased payload.
pub type ContentData = Arc<dyn Any + Send + Sync>;

/// Single-slot store shared between an entry and its readers/writers.
///
/// Cloning shares the slot.
#[derive(Clone, Default)]
pub struct DataStore {
    slot: Arc<Mutex<Option<ContentData>>>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `data`.
    pub fn with_data(data: Option<ContentData>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(data)),
        }
    }

    /// Read-only view.
    pub fn reader(&self) -> DataReader {
        DataReader {
            store: self.clone(),
        }
    }

    /// Write view.
    pub fn writer(&self) -> DataWriter {
        DataWriter {
            store: self.clone(),
        }
    }

    /// Returns true if both handles share the same slot.
    pub fn same_store(&self, other: &DataStore) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ContentData>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("has_data", &self.lock().is_some())
            .finish()
    }
}

/// Read access to a [`DataStore`].
#[derive(Clone, Debug)]
pub struct DataReader {
    store: DataStore,
}

impl DataReader {
    /// Returns true if the slot holds anything.
    pub fn has_data(&self) -> bool {
        self.store.lock().is_some()
    }

    /// Payload as `T`, or `None` when empty or of another type.
    pub fn try_read<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let data = self.store.lock().clone()?;
        data.downcast::<T>().ok()
    }

    /// Payload as `T`, failing when empty or of another type.
    pub fn read<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.try_read::<T>().ok_or(NavigationError::MissingData {
            expected: std::any::type_name::<T>(),
        })
    }

    /// Raw payload.
    pub fn raw(&self) -> Option<ContentData> {
        self.store.lock().clone()
    }

    /// The store behind this reader.
    pub fn store(&self) -> &DataStore {
        &self.store
    }
}

/// Write access to a [`DataStore`].
#[derive(Clone, Debug)]
pub struct DataWriter {
    store: DataStore,
}

impl DataWriter {
    /// Replace the payload.
    pub fn write<T: Any + Send + Sync>(&self, value: T) {
        *self.store.lock() = Some(Arc::new(value));
    }

    /// Replace the payload with an already-shared value.
    pub fn write_shared(&self, value: ContentData) {
        *self.store.lock() = Some(value);
    }

    /// Empty the slot.
    pub fn clear(&self) {
        *self.store.lock() = None;
    }
}
