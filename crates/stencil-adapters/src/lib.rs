//! Infrastructure adapters for Stencil.
//!
//! This crate implements the ports defined in `stencil_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod config_source;
pub mod filesystem;
pub mod paths;
pub mod renderer;
pub mod types;

// Re-export commonly used adapters
pub use config_source::FileConfigSource;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use paths::ModuleMap;
pub use renderer::HandlebarsRenderer;
pub use types::{InMemoryTypes, SourceScanner};
