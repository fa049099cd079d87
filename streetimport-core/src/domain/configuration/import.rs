// streetimport-core/src/domain/configuration/import.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::outcome::Severity;

/// Process-level configuration read from `streetimport.yaml`.
#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_delimiter")]
    #[validate(custom(function = "validate_delimiter"))]
    pub delimiter: String,

    #[serde(default = "default_encoding")]
    #[validate(length(min = 1, message = "Encoding label cannot be empty"))]
    pub encoding: String,

    #[serde(rename = "log-level", default)]
    pub log_level: Severity,

    #[serde(rename = "settings-path", default = "default_settings_path")]
    #[validate(length(min = 1, message = "Settings path cannot be empty"))]
    pub settings_path: String,

    /// Forces the active domain, bypassing the stored one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub folders: FolderConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            encoding: default_encoding(),
            log_level: Severity::default(),
            settings_path: default_settings_path(),
            domain: None,
            folders: FolderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct FolderConfig {
    #[serde(default = "default_processing")]
    #[validate(length(min = 1))]
    pub processing: String,
    #[serde(default = "default_processed")]
    #[validate(length(min = 1))]
    pub processed: String,
    #[serde(default = "default_failed")]
    #[validate(length(min = 1))]
    pub failed: String,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            processing: default_processing(),
            processed: default_processed(),
            failed: default_failed(),
        }
    }
}

pub(crate) fn validate_delimiter(value: &str) -> Result<(), ValidationError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(()),
        _ => {
            let mut err = ValidationError::new("delimiter");
            err.message = Some("Delimiter must be a single ASCII character".into());
            Err(err)
        }
    }
}

fn default_delimiter() -> String {
    ";".to_string()
}
fn default_encoding() -> String {
    "UTF-8".to_string()
}
fn default_settings_path() -> String {
    "settings.json".to_string()
}
fn default_processing() -> String {
    "processing".to_string()
}
fn default_processed() -> String {
    "processed".to_string()
}
fn default_failed() -> String {
    "failed".to_string()
}
