//! Key-value slots backing the lead store.
//!
//! The store serializes its whole collection into one slot under a fixed key.
//! `FileStorage` keeps each slot as `<dir>/<key>.json`; `MemoryStorage` keeps
//! them in a map and is what tests and throwaway sessions use.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Errors from reading or writing a storage slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize slot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A local key-value slot holding one serialized document per key.
pub trait KeyValueStorage: Send + Sync {
    /// Read a slot. `Ok(None)` means the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Slots as JSON files in one directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;
        }
        write_atomic(&self.slot_path(key), value)
    }
}

/// Write through a sibling temp file and rename over the target.
fn write_atomic(path: &Path, payload: &str) -> Result<(), StorageError> {
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, payload).map_err(|source| StorageError::Io {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// In-process slots. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
