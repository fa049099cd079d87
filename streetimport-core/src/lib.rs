// streetimport-core/src/lib.rs

// 1. Documentation is optional for now
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for the outside world: entity repository, settings storage, data sources.
pub mod ports;

// 2. Domain (business core)
// Records, outcome log, handler contract, domain configuration.
// Depends only on the ports.
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV data source, settings files, in-memory repository, config loader.
pub mod infrastructure;

// 4. Application (Use Cases)
// Dispatcher, folder import, built-in domain profiles.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use streetimport_core::ImportError;
pub use error::ImportError;
