//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use tracing::debug;

use stencil_core::{
    application::{ApplicationError, ports::ArtifactStore},
    error::{StencilError, StencilResult},
};

/// Production artifact store writing to the local disk.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, content: &str) -> StencilResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| map_io_error(parent, e, "create directory"))?;
            }
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))?;
        debug!(path = %path.display(), bytes = content.len(), "File written");
        Ok(())
    }

    fn delete(&self, path: &Path) -> StencilResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StencilError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
