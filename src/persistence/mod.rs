//! Key-value persistence for dashboard preferences
//!
//! The dashboard only sees the [`KeyValueStore`] trait. Thresholds and theme
//! are a best-effort cache: load problems fall back to defaults and write
//! failures are logged and dropped.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{error, info, warn};

use crate::alerts::ThresholdMap;
use crate::error::{DashboardError, Result};
use crate::types::Theme;

pub const THEME_KEY: &str = "theme";
pub const THRESHOLDS_KEY: &str = "crypto-thresholds";

/// Injected string key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, used in tests and when no data dir is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Single JSON object file mapping keys to string values
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(DashboardError::CorruptStore(format!(
                "{} holds {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        let object = self.read_object()?;
        Ok(object.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut object = self.read_object()?;
        object.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&Value::Object(object))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load the threshold map. Missing or malformed data yields an empty map.
pub fn load_thresholds(store: &dyn KeyValueStore) -> ThresholdMap {
    let raw = match store.get(THRESHOLDS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ThresholdMap::new(),
        Err(e) => {
            error!(key = THRESHOLDS_KEY, error = %e, "Failed to read saved thresholds");
            return ThresholdMap::new();
        }
    };

    match serde_json::from_str::<HashMap<String, f64>>(&raw) {
        Ok(levels) => {
            let map: ThresholdMap = levels.into_iter().collect();
            info!(count = map.len(), "📂 Thresholds loaded");
            map
        }
        Err(e) => {
            error!(key = THRESHOLDS_KEY, error = %e, "Saved thresholds are malformed, starting empty");
            ThresholdMap::new()
        }
    }
}

pub fn save_thresholds(store: &dyn KeyValueStore, thresholds: &ThresholdMap) {
    let result = serde_json::to_string(thresholds)
        .map_err(DashboardError::from)
        .and_then(|json| store.set(THRESHOLDS_KEY, &json));
    if let Err(e) = result {
        warn!(key = THRESHOLDS_KEY, error = %e, "Failed to persist thresholds");
    }
}

pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::from_stored(&raw),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!(key = THEME_KEY, error = %e, "Failed to read saved theme");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) {
    if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
        warn!(key = THEME_KEY, error = %e, "Failed to persist theme");
    }
}
