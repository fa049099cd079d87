// streetimport-core/src/infrastructure/adapters/mod.rs

pub mod memory;

pub use memory::InMemoryRepository;
