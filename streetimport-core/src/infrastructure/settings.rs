// streetimport-core/src/infrastructure/settings.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ImportError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::settings::SettingsStore;

/// Settings persisted as one JSON document: `{ "<group>": { "<name>": <value> } }`.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, InfrastructureError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(InfrastructureError::ConfigError(format!(
                "Settings file {:?} must contain a JSON object",
                self.path
            ))),
        }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self, group: &str, name: &str) -> Result<Option<Value>, ImportError> {
        let document = self.read_document()?;
        Ok(document
            .get(group)
            .and_then(|g| g.get(name))
            .cloned())
    }

    // Last writer wins: concurrent processes are not coordinated.
    fn store(&self, group: &str, name: &str, value: &Value) -> Result<(), ImportError> {
        let mut document = self.read_document()?;
        let entry = document
            .entry(group.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(g) = entry {
            g.insert(name.to_string(), value.clone());
        }

        let content = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(InfrastructureError::JsonError)?;
        atomic_write(&self.path, content)?;
        debug!(path = ?self.path, group, name, "Setting stored");
        Ok(())
    }
}

/// Process-local store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<Map<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(group: &str, name: &str) -> String {
        format!("{}/{}", group, name)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, group: &str, name: &str) -> Result<Option<Value>, ImportError> {
        let values = self
            .values
            .lock()
            .map_err(|_| ImportError::InternalError("Settings store mutex poisoned".into()))?;
        Ok(values.get(&Self::key(group, name)).cloned())
    }

    fn store(&self, group: &str, name: &str, value: &Value) -> Result<(), ImportError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ImportError::InternalError("Settings store mutex poisoned".into()))?;
        values.insert(Self::key(group, name), value.clone());
        Ok(())
    }
}
