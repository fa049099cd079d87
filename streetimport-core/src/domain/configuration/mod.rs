// streetimport-core/src/domain/configuration/mod.rs

pub mod domain_config;
pub mod import;
pub mod lookups;
pub mod registry;
pub mod settings;

pub use domain_config::{DomainConfig, SETTINGS_GROUP};
pub use import::{FolderConfig, ImportConfig};
pub use lookups::{MetadataCache, MetadataKind};
pub use registry::{DomainProfile, DomainRegistry};
pub use settings::SettingPath;
