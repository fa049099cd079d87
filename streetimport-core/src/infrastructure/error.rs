// streetimport-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(streetimport::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- DELIMITED FILES ---
    #[error("CSV Parsing Error: {0}")]
    #[diagnostic(
        code(streetimport::infra::csv),
        help("Check quoting and line endings of the input file.")
    )]
    Csv(#[from] csv::Error),

    #[error("Unsupported encoding '{0}'")]
    #[diagnostic(
        code(streetimport::infra::encoding),
        help("Use an ASCII-compatible label such as UTF-8, ISO-8859-1 or windows-1252.")
    )]
    UnsupportedEncoding(String),

    // --- CONFIG / YAML / JSON ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(streetimport::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(streetimport::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(streetimport::infra::config))]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(streetimport::infra::config_invalid),
        help("Check delimiter, encoding and folder names in streetimport.yaml.")
    )]
    Validation(#[from] validator::ValidationErrors),
}
