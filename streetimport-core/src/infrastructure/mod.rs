// streetimport-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod datasource;
pub mod error;
pub mod fs;
pub mod settings;
