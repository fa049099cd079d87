// streetimport-core/src/ports/settings.rs

use serde_json::Value;

use crate::error::ImportError;

/// Durable key-value storage addressed by (group, name).
pub trait SettingsStore: Send + Sync {
    fn load(&self, group: &str, name: &str) -> Result<Option<Value>, ImportError>;

    fn store(&self, group: &str, name: &str, value: &Value) -> Result<(), ImportError>;
}
