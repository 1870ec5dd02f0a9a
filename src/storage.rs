//! Browser storage backends for the workout snapshot.

use log::warn;
use mapty::{MemoryStorage, SnapshotStorage, StorageError};
use wasm_bindgen::JsValue;

fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// The window's `localStorage`.
#[derive(Debug)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let inner = window
            .local_storage()
            .map_err(|e| StorageError::Backend(js_error_text(&e)))?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { inner })
    }
}

impl SnapshotStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|e| StorageError::Backend(js_error_text(&e)))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(js_error_text(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|e| StorageError::Backend(js_error_text(&e)))
    }
}

/// `localStorage` when the browser allows it, session memory otherwise.
#[derive(Debug)]
pub enum BrowserStorage {
    Local(LocalStorage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn open() -> Self {
        match LocalStorage::open() {
            Ok(storage) => BrowserStorage::Local(storage),
            Err(e) => {
                warn!("{}; workouts will not survive a reload", e);
                BrowserStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl SnapshotStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            BrowserStorage::Local(s) => s.read(key),
            BrowserStorage::Memory(s) => s.read(key),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.write(key, value),
            BrowserStorage::Memory(s) => s.write(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.remove(key),
            BrowserStorage::Memory(s) => s.remove(key),
        }
    }
}
