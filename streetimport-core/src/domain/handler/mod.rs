// streetimport-core/src/domain/handler/mod.rs

pub mod filename;
pub mod support;

pub use filename::{FileNameCache, FileNameInfo};
pub use support::ActivitySpec;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::configuration::DomainConfig;
use crate::domain::error::DomainError;
use crate::domain::outcome::ImportResult;
use crate::domain::record::Record;
use crate::ports::repository::EntityRepository;

/// Failure raised by a handler while processing one record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The record is rejected; the run goes on.
    #[error("{0}")]
    Record(String),
    /// The whole run has to stop.
    #[error("{0}")]
    Fatal(String),
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        match err {
            // A missing prerequisite type will fail every following record too.
            DomainError::MissingReference { .. } => HandlerError::Fatal(err.to_string()),
            other => HandlerError::Record(other.to_string()),
        }
    }
}

/// One pluggable unit of business logic.
///
/// The dispatcher offers each record to its handlers in registration order
/// and runs the first one whose `can_process_record` answers true.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Must be free of observable side effects: it may be called for every record of a file.
    fn can_process_record(&self, record: &Record, source: &Path) -> bool;

    /// Realizes the record against the repository. Implementations report their
    /// own success or failure on `ctx.result` before returning `Ok`.
    async fn process_record(
        &mut self,
        record: &Record,
        source: &Path,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), HandlerError>;
}

/// Everything a handler may touch while processing a record.
pub struct HandlerContext<'a> {
    pub repository: &'a dyn EntityRepository,
    pub config: &'a DomainConfig,
    pub result: &'a mut ImportResult,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        repository: &'a dyn EntityRepository,
        config: &'a DomainConfig,
        result: &'a mut ImportResult,
    ) -> Self {
        Self {
            repository,
            config,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_escalates() {
        let err: HandlerError = DomainError::MissingReference {
            kind: "activity type".into(),
            name: "Import".into(),
        }
        .into();
        assert!(matches!(err, HandlerError::Fatal(_)));

        let err: HandlerError = DomainError::Lookup("timeout".into()).into();
        assert_eq!(err, HandlerError::Record("Metadata lookup failed: timeout".into()));
    }
}
