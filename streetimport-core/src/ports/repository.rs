// streetimport-core/src/ports/repository.rs

// What the import engine needs from the host CRM, without knowing how it is stored.
// Handlers talk to contacts, addresses, phones and activities only through this trait.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Parameters of one repository call, keyed by CRM field name.
pub type Params = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub count: usize,
    #[serde(default)]
    pub values: Vec<Params>,
}

impl ApiResponse {
    pub fn first(&self) -> Option<&Params> {
        self.values.first()
    }

    /// Id of the only matching entity, if exactly one matched.
    pub fn single_id(&self) -> Option<i64> {
        if self.count != 1 {
            return None;
        }
        self.id
            .or_else(|| self.first().and_then(|v| v.get("id")).and_then(Value::as_i64))
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum RepositoryError {
    #[error("{entity} with id {id} not found")]
    #[diagnostic(code(streetimport::repository::not_found))]
    NotFound { entity: String, id: i64 },

    #[error("{entity} rejected by the CRM: {reason}")]
    #[diagnostic(code(streetimport::repository::rejected))]
    Rejected { entity: String, reason: String },

    #[error("Repository backend error: {0}")]
    #[diagnostic(code(streetimport::repository::backend))]
    Backend(String),
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn create(&self, entity: &str, params: Params) -> Result<ApiResponse, RepositoryError>;

    async fn update(
        &self,
        entity: &str,
        id: i64,
        params: Params,
    ) -> Result<ApiResponse, RepositoryError>;

    /// Entities whose fields equal every given parameter. No match is an empty response.
    async fn get(&self, entity: &str, params: Params) -> Result<ApiResponse, RepositoryError>;

    async fn get_count(&self, entity: &str, params: Params) -> Result<usize, RepositoryError>;
}
