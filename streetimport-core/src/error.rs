// streetimport-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ImportError {
    // --- DOMAIN ERRORS (handlers, domain resolution, settings) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, encoding) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- FATAL RUN ABORT ---
    // The only error allowed to unwind past the per-record boundary.
    #[error("Import aborted: {0}")]
    #[diagnostic(
        code(streetimport::aborted),
        help("See the fatal entries of the import log for details.")
    )]
    Aborted(String),

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl ImportError {
    pub fn is_abort(&self) -> bool {
        matches!(self, ImportError::Aborted(_))
    }
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::Infrastructure(InfrastructureError::Io(err))
    }
}
