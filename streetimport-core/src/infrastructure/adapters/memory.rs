// streetimport-core/src/infrastructure/adapters/memory.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::ports::repository::{ApiResponse, EntityRepository, Params, RepositoryError};

/// Entity repository held in memory. Backs tests and the CLI dry run.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    entities: BTreeMap<String, Vec<Params>>,
    rejected: HashSet<String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with the reference types a CRM ships with.
    pub fn with_reference_data() -> Self {
        let repo = Self::new();
        for name in ["Home", "Work", "Main", "Other"] {
            repo.seed("LocationType", object(json!({ "name": name })));
        }
        let option_values = [
            ("activity_type", ["Import", "Meeting", "Phone Call"]),
            ("activity_status", ["Scheduled", "Completed", "Cancelled"]),
            ("gender", ["Female", "Male", "Other"]),
        ];
        for (group, names) in option_values {
            for (value, name) in names.iter().enumerate() {
                repo.seed(
                    "OptionValue",
                    object(json!({ "option_group_id": group, "name": name, "value": value + 1 })),
                );
            }
        }
        repo
    }

    /// Inserts an entity outside of the async API and returns its id.
    pub fn seed(&self, entity: &str, params: Params) -> i64 {
        match self.state.lock() {
            Ok(mut state) => state.insert(entity, params),
            Err(poisoned) => poisoned.into_inner().insert(entity, params),
        }
    }

    /// Every later write to `entity` is rejected.
    pub fn reject_entity(&self, entity: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.rejected.insert(entity.to_string());
        }
    }

    pub fn entities(&self, entity: &str) -> Vec<Params> {
        self.state
            .lock()
            .map(|state| state.entities.get(entity).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Whole content, keyed by entity name.
    pub fn snapshot(&self) -> Value {
        let Ok(state) = self.state.lock() else {
            return Value::Null;
        };
        Value::Object(
            state
                .entities
                .iter()
                .map(|(name, rows)| {
                    let rows = rows.iter().cloned().map(Value::Object).collect();
                    (name.clone(), Value::Array(rows))
                })
                .collect(),
        )
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Backend("In-memory repository mutex poisoned".into()))
    }
}

impl State {
    fn insert(&mut self, entity: &str, mut params: Params) -> i64 {
        self.last_id += 1;
        params.insert("id".into(), json!(self.last_id));
        self.entities.entry(entity.to_string()).or_default().push(params);
        self.last_id
    }

    fn check_writable(&self, entity: &str) -> Result<(), RepositoryError> {
        if self.rejected.contains(entity) {
            return Err(RepositoryError::Rejected {
                entity: entity.to_string(),
                reason: "writes are disabled".into(),
            });
        }
        Ok(())
    }
}

fn object(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn matches_filter(row: &Params, filter: &Params) -> bool {
    filter.iter().all(|(k, v)| row.get(k) == Some(v))
}

#[async_trait]
impl EntityRepository for InMemoryRepository {
    async fn create(&self, entity: &str, params: Params) -> Result<ApiResponse, RepositoryError> {
        let mut state = self.lock()?;
        state.check_writable(entity)?;
        let id = state.insert(entity, params);
        let stored = state
            .entities
            .get(entity)
            .and_then(|rows| rows.last())
            .cloned()
            .unwrap_or_default();
        Ok(ApiResponse {
            id: Some(id),
            count: 1,
            values: vec![stored],
        })
    }

    async fn update(
        &self,
        entity: &str,
        id: i64,
        params: Params,
    ) -> Result<ApiResponse, RepositoryError> {
        let mut state = self.lock()?;
        state.check_writable(entity)?;
        let row = state
            .entities
            .get_mut(entity)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get("id").and_then(Value::as_i64) == Some(id))
            })
            .ok_or_else(|| RepositoryError::NotFound {
                entity: entity.to_string(),
                id,
            })?;

        for (k, v) in params {
            if k != "id" {
                row.insert(k, v);
            }
        }
        Ok(ApiResponse {
            id: Some(id),
            count: 1,
            values: vec![row.clone()],
        })
    }

    async fn get(&self, entity: &str, params: Params) -> Result<ApiResponse, RepositoryError> {
        let state = self.lock()?;
        if state.rejected.contains(entity) {
            return Err(RepositoryError::Backend(format!("{} is unavailable", entity)));
        }
        let values: Vec<Params> = state
            .entities
            .get(entity)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_filter(r, &params))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let id = match values.as_slice() {
            [only] => only.get("id").and_then(Value::as_i64),
            _ => None,
        };
        Ok(ApiResponse {
            id,
            count: values.len(),
            values,
        })
    }

    async fn get_count(&self, entity: &str, params: Params) -> Result<usize, RepositoryError> {
        self.get(entity, params).await.map(|r| r.count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_update() {
        let repo = InMemoryRepository::new();
        let created = repo
            .create("Contact", object(json!({"first_name": "Ann"})))
            .await
            .unwrap();
        let id = created.id.unwrap();

        repo.update("Contact", id, object(json!({"last_name": "Smith"})))
            .await
            .unwrap();

        let found = repo
            .get("Contact", object(json!({"first_name": "Ann"})))
            .await
            .unwrap();
        assert_eq!(found.single_id(), Some(id));
        assert_eq!(found.values[0].get("last_name"), Some(&json!("Smith")));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let repo = InMemoryRepository::new();
        let err = repo.update("Contact", 42, Params::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_rejected_entity() {
        let repo = InMemoryRepository::new();
        repo.reject_entity("Contact");
        assert!(repo.create("Contact", Params::new()).await.is_err());
        assert!(repo.get("Contact", Params::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_reference_data_and_snapshot() {
        let repo = InMemoryRepository::with_reference_data();
        let count = repo
            .get_count("OptionValue", object(json!({"option_group_id": "gender"})))
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(repo.entities("LocationType").len(), 4);
        assert!(repo.snapshot().get("OptionValue").is_some());
    }
}
