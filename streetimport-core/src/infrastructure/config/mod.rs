pub mod import;

pub use crate::domain::configuration::ImportConfig;
pub use import::load_import_config;
