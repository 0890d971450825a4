//! Key/value option storage.
//!
//! Options are JSON values addressed by key, the same shape the host's option
//! table exposes. Two stores ship: an in-memory one for tests and embedding,
//! and a JSON file that is rewritten on every update.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use crate::errors::SettingsError;

/// Port for persisted options.
pub trait OptionStore: Send + Sync {
    fn get_option(&self, key: &str) -> Result<Option<Value>, SettingsError>;

    fn update_option(&self, key: &str, value: Value) -> Result<(), SettingsError>;
}

fn lock(values: &Mutex<BTreeMap<String, Value>>) -> MutexGuard<'_, BTreeMap<String, Value>> {
    values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Options held in memory.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `values`.
    pub fn with_values(values: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn update_option(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }
}

/// Options persisted as one JSON object in a file.
///
/// A missing file is treated as an empty store and created on first write.
#[derive(Debug)]
pub struct JsonFileOptionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileOptionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), options = values.len(), "Opened option file");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionStore for JsonFileOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn update_option(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value);
        let encoded = serde_json::to_vec_pretty(&*values)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}
