// streetimport/src/commands/mod.rs

pub mod domains;
pub mod import;
pub mod import_folder;
pub mod settings;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use streetimport_core::application::builtin_registry;
use streetimport_core::domain::configuration::DomainConfig;
use streetimport_core::infrastructure::adapters::InMemoryRepository;
use streetimport_core::infrastructure::config::load_import_config;
use streetimport_core::infrastructure::fs::atomic_write;
use streetimport_core::infrastructure::settings::JsonFileSettingsStore;
use tracing::{debug, info};

/// Config file, settings store and domain registry, wired together.
pub fn load_domain_config(config_dir: &Path) -> anyhow::Result<DomainConfig> {
    let import = load_import_config(config_dir).with_context(|| {
        format!("Failed to load import configuration from {:?}", config_dir)
    })?;
    debug!(settings = %import.settings_path, "Opening settings store");
    let store = Arc::new(JsonFileSettingsStore::new(&import.settings_path));
    let config = DomainConfig::load(import, store, builtin_registry())
        .context("Failed to load domain settings")?;
    info!(domain = ?config.configured_domain(), "Domain configuration loaded");
    Ok(config)
}

pub fn dump_repository(repository: &InMemoryRepository, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let content = serde_json::to_string_pretty(&repository.snapshot())?;
    atomic_write(path, content).with_context(|| format!("Failed to write dump to {:?}", path))?;
    println!("💾 Repository dump written to {}", path.display());
    Ok(())
}
