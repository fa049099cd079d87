// streetimport-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("No active domain could be resolved ({0} domains registered)")]
    #[diagnostic(
        code(streetimport::domain::unresolved),
        help("Set the active domain with `streetimport settings set-domain <id>` or in streetimport.yaml.")
    )]
    DomainNotResolved(usize),

    #[error("Unknown domain '{0}'")]
    #[diagnostic(code(streetimport::domain::unknown))]
    UnknownDomain(String),

    #[error("Setting path must contain at least one segment")]
    #[diagnostic(code(streetimport::domain::settings))]
    EmptySettingPath,

    #[error("Missing {kind} '{name}' in the CRM")]
    #[diagnostic(
        code(streetimport::domain::missing_reference),
        help("Create the reference type in the CRM before running the import.")
    )]
    MissingReference { kind: String, name: String },

    #[error("Metadata lookup failed: {0}")]
    #[diagnostic(code(streetimport::domain::lookup))]
    Lookup(String),

    #[error("Record field '{0}' is reserved and cannot be overwritten")]
    #[diagnostic(code(streetimport::domain::record))]
    ReservedField(String),

    #[error("Invalid handler configuration: {0}")]
    #[diagnostic(code(streetimport::domain::handler))]
    HandlerConfig(String),
}
