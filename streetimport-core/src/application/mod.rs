// streetimport-core/src/application/mod.rs

pub mod batch;
pub mod dispatcher;
pub mod domains;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI can write `use streetimport_core::application::{import_file, import_folder};`
// without knowing the file layout.

pub use batch::{FileImport, import_folder};
pub use dispatcher::{DispatchPolicy, Dispatcher, RunState, import_file, run_file};
pub use domains::builtin_registry;
