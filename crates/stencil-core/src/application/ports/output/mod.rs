//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::TypeDefinition;
use crate::error::StencilResult;

/// Parameters handed to a template renderer.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Port for artifact storage.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactStore: Send + Sync {
    /// Check if a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// Write content to a file, creating missing parent directories.
    fn write(&self, path: &Path, content: &str) -> StencilResult<()>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> StencilResult<()>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `stencil_adapters::renderer::HandlebarsRenderer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render the template registered under `template` with `params`.
    fn render(&self, template: &str, params: &Params) -> StencilResult<String>;
}

/// Port for module and application path resolution.
///
/// Implemented by:
/// - `stencil_adapters::paths::ModuleMap`
pub trait PathResolver: Send + Sync {
    /// Root of the application tree.
    fn app_root(&self) -> PathBuf;

    /// Directory of `module`, under `base` when given.
    ///
    /// Fails with `DomainError::ModuleNotFound` when `verify` is set and the
    /// directory does not exist.
    fn module_path(&self, module: &str, verify: bool, base: Option<&Path>)
    -> StencilResult<PathBuf>;
}

/// Port for statically extracted type definitions.
///
/// Implemented by:
/// - `stencil_adapters::types::SourceScanner` (reads `*.php` sources)
/// - `stencil_adapters::types::InMemoryTypes` (testing, fixtures)
pub trait TypeSource: Send + Sync {
    /// Definition of the named type, if known.
    fn find(&self, name: &str) -> StencilResult<Option<TypeDefinition>>;

    /// Source file declaring the named type, if known.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Port for configuration and message lookups.
///
/// Implemented by:
/// - `stencil_adapters::config::FileConfigSource`
pub trait ConfigSource: Send + Sync {
    /// Whole structure of `source`, or the value at the dot-separated `key`.
    fn get(&self, source: &str, key: Option<&str>) -> StencilResult<Option<serde_json::Value>>;
}
