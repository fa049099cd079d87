// streetimport-core/src/ports/data_source.rs

use std::path::Path;

use crate::domain::outcome::ImportResult;
use crate::domain::record::Record;
use crate::error::ImportError;

/// Sequential reader over one input resource.
///
/// `reset` (re)opens and validates the resource and primes a one-record
/// lookahead. Failures are logged as fatal on the given result and returned
/// as [`ImportError::Aborted`].
pub trait DataSource: Send {
    fn uri(&self) -> &Path;

    fn reset(&mut self, result: &mut ImportResult) -> Result<(), ImportError>;

    fn has_next(&self) -> bool;

    /// Returns the buffered record and refills the buffer. `Ok(None)` once exhausted.
    fn next(&mut self, result: &mut ImportResult) -> Result<Option<Record>, ImportError>;

    /// Releases the underlying handle. Safe to call repeatedly.
    fn close(&mut self);

    fn header(&self) -> &[String];
}

/// Pluggable check run against the header row before any record is read.
pub trait HeaderPolicy: Send + Sync {
    fn validate(&self, header: &[String]) -> Result<(), String>;
}

/// Rejects headers missing any of the listed columns.
#[derive(Debug, Clone, Default)]
pub struct RequiredColumns(pub Vec<String>);

impl HeaderPolicy for RequiredColumns {
    fn validate(&self, header: &[String]) -> Result<(), String> {
        let missing: Vec<&str> = self
            .0
            .iter()
            .filter(|c| !header.contains(c))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required columns: {}", missing.join(", ")))
        }
    }
}
