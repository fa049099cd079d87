// streetimport/src/commands/settings.rs
//
// USE CASE: Read and write domain settings.

use std::path::Path;

use serde_json::Value;
use streetimport_core::domain::configuration::SettingPath;
use tracing::info;

use super::load_domain_config;
use crate::cli::SettingsAction;

pub fn execute(config_dir: &Path, action: SettingsAction) -> anyhow::Result<()> {
    let mut config = load_domain_config(config_dir)?;

    match action {
        SettingsAction::Get { path } => {
            let value = config.get_setting(SettingPath::dotted(&path), Value::Null);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        SettingsAction::Set { path, value } => {
            let value = parse_value(&value);
            config.set_setting(SettingPath::dotted(&path), value.clone())?;
            config.store_settings()?;
            info!(path = %path, "Setting stored");
            println!("✅ {} = {}", path, value);
        }
        SettingsAction::SetDomain { domain } => {
            config.set_domain(&domain)?;
            config.store_settings()?;
            info!(domain = %domain, "Active domain stored");
            println!("✅ Active domain: {}", domain);
        }
    }
    Ok(())
}

/// JSON when it parses, plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
