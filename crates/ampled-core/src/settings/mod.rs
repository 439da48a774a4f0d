//! Persisted plugin settings
//!
//! Settings live in the host's configuration store as a flat mapping. A stored
//! record is only trusted when every default key is present with the same
//! kind of value; otherwise the whole record is replaced by the defaults.

mod store;

pub use store::{ConfigStore, JsonFileStore, MemoryStore};

#[cfg(test)]
pub(crate) use store::MockConfigStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Persisted mapping
pub type Mapping = serde_json::Map<String, Value>;

/// Default settings record key
pub const DEFAULT_SETTINGS_KEY: &str = "gpio_config_config";

/// Kind of a JSON value, as far as validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Whole number
    Integer,
    /// Number with a fractional part
    Float,
    /// Text
    String,
    /// List
    Array,
    /// Nested mapping
    Mapping,
}

impl SemanticType {
    /// Classify a value
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Mapping,
        }
    }
}

/// Integer `0`/`1` stands in for a boolean, as older terminals stored flags.
fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Return the stored mapping when it matches `defaults` key-for-key by type.
///
/// Flags stored as `0`/`1` are accepted and normalised to booleans.
fn validated(loaded: Option<&Value>, defaults: &Mapping) -> Option<Mapping> {
    let mut mapping = loaded?.as_object()?.clone();
    for (key, default) in defaults {
        let value = mapping.get_mut(key)?;
        if SemanticType::of(default) == SemanticType::Boolean {
            *value = Value::Bool(as_flag(value)?);
        } else if SemanticType::of(value) != SemanticType::of(default) {
            return None;
        }
    }
    Some(mapping)
}

/// Load the mapping stored under `key`, falling back to `defaults`.
///
/// Missing, non-mapping or mistyped records are discarded: `defaults` is
/// written back (overwriting) and returned. Store errors are propagated.
pub fn load_or_default(store: &dyn ConfigStore, key: &str, defaults: &Mapping) -> Result<Mapping> {
    let loaded = store.load_mapping(key)?;
    if let Some(mapping) = validated(loaded.as_ref(), defaults) {
        debug!(key, "Loaded settings");
        return Ok(mapping);
    }

    if loaded.is_some() {
        warn!(key, "Stored settings are malformed, resetting to defaults");
    } else {
        debug!(key, "No stored settings, writing defaults");
    }
    store.save_mapping(key, defaults, true)?;
    Ok(defaults.clone())
}

/// Plugin settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Electrical level that lights an LED. `false` for active-low wiring.
    pub led_on: bool,
    /// Emit a debug record for every handled event
    pub log_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            led_on: false,
            log_on: true,
        }
    }
}

impl Settings {
    /// Level to write for a logical LED state
    #[must_use]
    pub fn led_level(&self, lit: bool) -> bool {
        if lit {
            self.led_on
        } else {
            !self.led_on
        }
    }

    /// As a store mapping
    #[must_use]
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert("led_on".to_string(), Value::Bool(self.led_on));
        mapping.insert("log_on".to_string(), Value::Bool(self.log_on));
        mapping
    }

    /// From a store mapping; unknown keys are ignored
    pub fn from_mapping(mapping: &Mapping) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(mapping.clone()))?)
    }

    /// Load from `store`, resetting malformed records
    pub fn load(store: &dyn ConfigStore, key: &str) -> Result<Self> {
        let mapping = load_or_default(store, key, &Self::default().to_mapping())?;
        Self::from_mapping(&mapping)
    }
}

#[cfg(test)]
mod tests;
