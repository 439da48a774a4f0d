use super::Mapping;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Host configuration store.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigStore: Send + Sync {
    /// Raw value stored under `key`, if any
    fn load_mapping(&self, key: &str) -> Result<Option<Value>>;

    /// Store `mapping` under `key`. Without `overwrite` an existing value is kept.
    fn save_mapping(&self, key: &str, mapping: &Mapping, overwrite: bool) -> Result<()>;
}

/// Volatile store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an arbitrary value under `key`
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    /// Current value under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl ConfigStore for MemoryStore {
    fn load_mapping(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key))
    }

    fn save_mapping(&self, key: &str, mapping: &Mapping, overwrite: bool) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if overwrite || !values.contains_key(key) {
            values.insert(key.to_string(), Value::Object(mapping.clone()));
        }
        Ok(())
    }
}

/// One `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir` (created on first save)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(Error::Store(format!("invalid settings key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl ConfigStore for JsonFileStore {
    fn load_mapping(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(&path)?;
        // Invalid UTF-8 surfaces as a JSON error here.
        match serde_json::from_slice(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Undecodable content counts as a malformed record, not a store failure.
                warn!(path = %path.display(), "Settings file is not valid JSON: {}", e);
                Ok(Some(Value::Null))
            }
        }
    }

    fn save_mapping(&self, key: &str, mapping: &Mapping, overwrite: bool) -> Result<()> {
        let path = self.path_for(key)?;
        if !overwrite && path.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(mapping)?)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }
}
