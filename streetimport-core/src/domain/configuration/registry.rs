// streetimport-core/src/domain/configuration/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::configuration::DomainConfig;
use crate::domain::error::DomainError;
use crate::domain::handler::RecordHandler;

/// An organization-specific profile: its settings defaults and its ordered handler set.
pub trait DomainProfile: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Defaults merged underneath the settings stored for this domain.
    fn default_settings(&self) -> Value {
        Value::Object(Map::new())
    }

    /// Handlers in dispatch order. Specific handlers come before generic fallbacks.
    fn handlers(&self, config: &DomainConfig) -> Result<Vec<Box<dyn RecordHandler>>, DomainError>;
}

/// Explicit map of domain identifiers to profiles, populated at startup.
#[derive(Clone, Default)]
pub struct DomainRegistry {
    profiles: BTreeMap<String, Arc<dyn DomainProfile>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, profile: Arc<dyn DomainProfile>) -> &mut Self {
        self.profiles.insert(profile.id().to_string(), profile);
        self
    }

    pub fn with(mut self, profile: Arc<dyn DomainProfile>) -> Self {
        self.register(profile);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DomainProfile>> {
        self.profiles.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Arc<dyn DomainProfile>> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// An explicit id wins; otherwise a lone registered profile is used implicitly.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<Arc<dyn DomainProfile>, DomainError> {
        match explicit {
            Some(id) => self
                .get(id)
                .ok_or_else(|| DomainError::UnknownDomain(id.to_string())),
            None if self.profiles.len() == 1 => self
                .profiles
                .values()
                .next()
                .cloned()
                .ok_or(DomainError::DomainNotResolved(0)),
            None => Err(DomainError::DomainNotResolved(self.profiles.len())),
        }
    }
}

impl std::fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.profiles.keys()).finish()
    }
}
