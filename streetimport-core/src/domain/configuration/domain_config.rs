// streetimport-core/src/domain/configuration/domain_config.rs

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::configuration::import::ImportConfig;
use crate::domain::configuration::lookups::MetadataCache;
use crate::domain::configuration::registry::{DomainProfile, DomainRegistry};
use crate::domain::configuration::settings::{SettingPath, get_path, set_path};
use crate::domain::error::DomainError;
use crate::domain::handler::RecordHandler;
use crate::domain::outcome::Severity;
use crate::error::ImportError;
use crate::ports::settings::SettingsStore;

/// Group under which the engine persists its settings.
pub const SETTINGS_GROUP: &str = "streetimport";
const DOMAIN_KEY: &str = "domain";
const SETTINGS_KEY: &str = "settings";

/// Settings and extension points of the active organization.
///
/// Built once at process entry and passed by reference to the dispatcher,
/// the data source and every handler. In-memory changes only reach the
/// settings store on [`DomainConfig::store_settings`].
pub struct DomainConfig {
    import: ImportConfig,
    store: Arc<dyn SettingsStore>,
    registry: DomainRegistry,
    stored_domain: Option<String>,
    settings: Map<String, Value>,
    lookups: MetadataCache,
}

impl DomainConfig {
    pub fn load(
        import: ImportConfig,
        store: Arc<dyn SettingsStore>,
        registry: DomainRegistry,
    ) -> Result<Self, ImportError> {
        let stored_domain = store
            .load(SETTINGS_GROUP, DOMAIN_KEY)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|d| !d.is_empty());

        let settings = match store.load(SETTINGS_GROUP, SETTINGS_KEY)? {
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(found = %other, "Stored domain settings are not a mapping, starting empty");
                Map::new()
            }
            None => Map::new(),
        };

        debug!(domain = ?stored_domain, domains = settings.len(), "Domain settings loaded");

        Ok(Self {
            import,
            store,
            registry,
            stored_domain,
            settings,
            lookups: MetadataCache::new(),
        })
    }

    pub fn import_config(&self) -> &ImportConfig {
        &self.import
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn lookups(&self) -> &MetadataCache {
        &self.lookups
    }

    pub fn log_threshold(&self) -> Severity {
        self.import.log_level
    }

    /// Domain as configured (process config first, then durable settings), unresolved.
    pub fn configured_domain(&self) -> Option<&str> {
        self.import
            .domain
            .as_deref()
            .or(self.stored_domain.as_deref())
    }

    pub fn profile(&self) -> Result<Arc<dyn DomainProfile>, DomainError> {
        self.registry.resolve(self.configured_domain())
    }

    pub fn domain(&self) -> Result<String, DomainError> {
        self.profile().map(|p| p.id().to_string())
    }

    pub fn set_domain(&mut self, id: &str) -> Result<(), DomainError> {
        if self.registry.get(id).is_none() {
            return Err(DomainError::UnknownDomain(id.to_string()));
        }
        self.stored_domain = Some(id.to_string());
        Ok(())
    }

    /// Settings tree of a domain, created empty on first access.
    pub fn domain_settings(&mut self, domain: &str) -> &mut Value {
        self.settings
            .entry(domain.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
    }

    /// Reads a setting of the active domain, falling back to the profile defaults.
    pub fn get_setting(&self, path: impl Into<SettingPath>, default: Value) -> Value {
        match self.profile() {
            Ok(profile) => self.get_setting_for(profile.id(), path, default),
            Err(_) => default,
        }
    }

    pub fn get_setting_for(
        &self,
        domain: &str,
        path: impl Into<SettingPath>,
        default: Value,
    ) -> Value {
        let path = path.into();
        if let Some(value) = self
            .settings
            .get(domain)
            .and_then(|tree| get_path(tree, &path))
        {
            return value.clone();
        }
        self.registry
            .get(domain)
            .and_then(|profile| get_path(&profile.default_settings(), &path).cloned())
            .unwrap_or(default)
    }

    pub fn setting_bool(&self, path: impl Into<SettingPath>, default: bool) -> bool {
        self.get_setting(path, Value::Bool(default))
            .as_bool()
            .unwrap_or(default)
    }

    pub fn setting_str(&self, path: impl Into<SettingPath>, default: &str) -> String {
        match self.get_setting(path, Value::Null) {
            Value::String(s) => s,
            _ => default.to_string(),
        }
    }

    pub fn setting_strings(&self, path: impl Into<SettingPath>) -> Vec<String> {
        match self.get_setting(path, Value::Null) {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_setting(
        &mut self,
        path: impl Into<SettingPath>,
        value: Value,
    ) -> Result<(), DomainError> {
        let domain = self.domain()?;
        self.set_setting_for(&domain, path, value)
    }

    pub fn set_setting_for(
        &mut self,
        domain: &str,
        path: impl Into<SettingPath>,
        value: Value,
    ) -> Result<(), DomainError> {
        let path = path.into();
        set_path(self.domain_settings(domain), &path, value)
    }

    /// Persists the settings mapping and the chosen domain.
    pub fn store_settings(&self) -> Result<(), ImportError> {
        self.store.store(
            SETTINGS_GROUP,
            SETTINGS_KEY,
            &Value::Object(self.settings.clone()),
        )?;
        if let Some(domain) = &self.stored_domain {
            self.store
                .store(SETTINGS_GROUP, DOMAIN_KEY, &Value::String(domain.clone()))?;
        }
        Ok(())
    }

    /// Ordered handler set of the active domain.
    pub fn handlers(&self) -> Result<Vec<Box<dyn RecordHandler>>, DomainError> {
        self.profile()?.handlers(self)
    }
}

impl std::fmt::Debug for DomainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainConfig")
            .field("import", &self.import)
            .field("registry", &self.registry)
            .field("stored_domain", &self.stored_domain)
            .field("settings", &self.settings)
            .finish()
    }
}
