// streetimport-core/src/domain/configuration/lookups.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::domain::error::DomainError;
use crate::ports::repository::{EntityRepository, Params};

/// CRM reference data the handlers resolve by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    LocationType,
    ActivityType,
    ActivityStatus,
    Gender,
}

impl MetadataKind {
    /// Entity, filter and id field used to resolve a name.
    fn query(self, name: &str) -> (&'static str, Params, &'static str) {
        let (entity, filter, id_field) = match self {
            MetadataKind::LocationType => ("LocationType", json!({ "name": name }), "id"),
            MetadataKind::ActivityType => (
                "OptionValue",
                json!({ "option_group_id": "activity_type", "name": name }),
                "value",
            ),
            MetadataKind::ActivityStatus => (
                "OptionValue",
                json!({ "option_group_id": "activity_status", "name": name }),
                "value",
            ),
            MetadataKind::Gender => (
                "OptionValue",
                json!({ "option_group_id": "gender", "name": name }),
                "value",
            ),
        };
        let params = match filter {
            Value::Object(map) => map,
            _ => Params::new(),
        };
        (entity, params, id_field)
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetadataKind::LocationType => "location type",
            MetadataKind::ActivityType => "activity type",
            MetadataKind::ActivityStatus => "activity status",
            MetadataKind::Gender => "gender",
        };
        f.write_str(label)
    }
}

/// Process-lifetime cache of reference ids.
#[derive(Debug, Default)]
pub struct MetadataCache {
    ids: Mutex<HashMap<(MetadataKind, String), i64>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, kind: MetadataKind, name: &str) -> Option<i64> {
        self.ids
            .lock()
            .ok()
            .and_then(|ids| ids.get(&(kind, name.to_string())).copied())
    }

    pub async fn resolve(
        &self,
        repository: &dyn EntityRepository,
        kind: MetadataKind,
        name: &str,
    ) -> Result<i64, DomainError> {
        if let Some(id) = self.cached(kind, name) {
            return Ok(id);
        }

        let (entity, params, id_field) = kind.query(name);
        let response = repository
            .get(entity, params)
            .await
            .map_err(|e| DomainError::Lookup(format!("{} '{}': {}", kind, name, e)))?;

        let id = response
            .first()
            .and_then(|v| v.get(id_field))
            .and_then(as_id)
            .ok_or_else(|| DomainError::MissingReference {
                kind: kind.to_string(),
                name: name.to_string(),
            })?;

        if let Ok(mut ids) = self.ids.lock() {
            ids.insert((kind, name.to_string()), id);
        }
        Ok(id)
    }
}

// Option values come back as numbers or numeric strings depending on the backend.
fn as_id(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::memory::InMemoryRepository;

    #[tokio::test]
    async fn test_resolve_and_cache() {
        let repo = InMemoryRepository::with_reference_data();
        let cache = MetadataCache::new();

        let home = cache
            .resolve(&repo, MetadataKind::LocationType, "Home")
            .await
            .unwrap();
        assert_eq!(cache.cached(MetadataKind::LocationType, "Home"), Some(home));

        let import = cache
            .resolve(&repo, MetadataKind::ActivityType, "Import")
            .await
            .unwrap();
        assert!(import > 0);
    }

    #[tokio::test]
    async fn test_missing_reference() {
        let repo = InMemoryRepository::new();
        let cache = MetadataCache::new();

        let err = cache
            .resolve(&repo, MetadataKind::Gender, "Female")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingReference { .. }));
        assert_eq!(cache.cached(MetadataKind::Gender, "Female"), None);
    }
}
