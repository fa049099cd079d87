// streetimport-core/src/ports/mod.rs

pub mod data_source;
pub mod repository;
pub mod settings;

pub use data_source::{DataSource, HeaderPolicy, RequiredColumns};
pub use repository::{ApiResponse, EntityRepository, Params, RepositoryError};
pub use settings::SettingsStore;
