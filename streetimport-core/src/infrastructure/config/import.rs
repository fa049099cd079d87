// streetimport-core/src/infrastructure/config/import.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::configuration::ImportConfig;
use crate::domain::outcome::Severity;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["streetimport.yaml", "streetimport.yml"];

// --- LOADER ---

#[instrument(skip(config_dir))]
pub fn load_import_config(config_dir: &Path) -> Result<ImportConfig, InfrastructureError> {
    // 1. Main file discovery; no file means defaults
    let mut config = match find_config(config_dir) {
        Some(path) => {
            info!(path = ?path, "Loading import configuration");
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                ImportConfig::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        }
        None => {
            info!(dir = ?config_dir, "No streetimport.yaml found, using defaults");
            ImportConfig::default()
        }
    };

    // 2. Environment overrides (layering)
    // STREETIMPORT_DOMAIN=generic streetimport import data.csv
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 3. Validation before anything touches a file
    config.validate()?;

    // 4. Relative settings path is anchored to the config directory
    let settings = PathBuf::from(&config.settings_path);
    if settings.is_relative() {
        config.settings_path = config_dir.join(settings).to_string_lossy().to_string();
    }

    Ok(config)
}

fn find_config(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn apply_env_overrides(config: &mut ImportConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(val) = env("STREETIMPORT_DOMAIN") {
        info!(old = ?config.domain, new = ?val, "Overriding domain via ENV");
        config.domain = Some(val);
    }
    if let Some(val) = env("STREETIMPORT_SETTINGS_PATH") {
        info!(old = ?config.settings_path, new = ?val, "Overriding settings path via ENV");
        config.settings_path = val;
    }
    if let Some(val) = env("STREETIMPORT_LOG_LEVEL") {
        match val.parse::<Severity>() {
            Ok(level) => config.log_level = level,
            Err(e) => warn!(value = ?val, "Ignoring STREETIMPORT_LOG_LEVEL: {}", e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = load_import_config(dir.path())?;
        assert_eq!(config.delimiter, ";");
        assert!(config.settings_path.ends_with("settings.json"));
        assert!(Path::new(&config.settings_path).starts_with(dir.path()));
        Ok(())
    }

    #[test]
    fn test_yml_extension_and_validation() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("streetimport.yml"), "delimiter: \"ab\"\n")?;
        assert!(matches!(
            load_import_config(dir.path()),
            Err(InfrastructureError::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ImportConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "STREETIMPORT_DOMAIN" => Some("generic".into()),
            "STREETIMPORT_LOG_LEVEL" => Some("loud".into()),
            _ => None,
        });
        assert_eq!(config.domain.as_deref(), Some("generic"));
        assert_eq!(config.log_level, Severity::Info);
    }
}
