// streetimport-core/src/application/domains/mod.rs

pub mod generic;

use std::sync::Arc;

use crate::domain::configuration::DomainRegistry;

pub use generic::{AuditTrailHandler, ContactRecordHandler, GenericDomain};

/// Registry of the domains shipped with the engine.
/// Deployments add their own profiles on top before building the DomainConfig.
pub fn builtin_registry() -> DomainRegistry {
    DomainRegistry::new().with(Arc::new(GenericDomain))
}
