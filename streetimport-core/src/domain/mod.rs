pub mod configuration;
pub mod error;
pub mod handler;
pub mod outcome;
pub mod record;

// Re-exports to keep imports short elsewhere
pub use configuration::{DomainConfig, DomainProfile, DomainRegistry, SettingPath};
pub use error::DomainError;
pub use handler::{HandlerContext, HandlerError, RecordHandler};
pub use outcome::{ApiResult, ImportResult, Severity};
pub use record::{Record, RecordBuilder};
