// streetimport-core/src/infrastructure/datasource/mod.rs

pub mod csv;

pub use self::csv::{CsvDataSource, CsvOptions, resolve_encoding};
