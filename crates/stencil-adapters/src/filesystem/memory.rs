//! In-memory artifact store for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use stencil_core::{
    application::{ApplicationError, ports::ArtifactStore},
    error::StencilResult,
};

/// In-memory filesystem. Clones share the same contents.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match self.inner.read() {
            Ok(inner) => inner.files.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// Mark a directory as existing without writing any file.
    pub fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.add_directories(path);
        Ok(())
    }
}

impl MemoryFilesystemInner {
    fn add_directories(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        match self.inner.read() {
            Ok(inner) => inner.files.contains_key(path) || inner.directories.contains(path),
            Err(_) => false,
        }
    }

    fn write(&self, path: &Path, content: &str) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if let Some(parent) = path.parent() {
            inner.add_directories(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn delete(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        match inner.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "File does not exist".into(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_registers_parent_directories() {
        let fs = MemoryFilesystem::new();
        fs.write(Path::new("/app/classes/Foo.php"), "x").unwrap();

        assert!(fs.exists(Path::new("/app/classes")));
        assert!(fs.exists(Path::new("/app")));
        assert_eq!(fs.read_file(Path::new("/app/classes/Foo.php")).unwrap(), "x");
    }

    #[test]
    fn delete_keeps_directories() {
        let fs = MemoryFilesystem::new();
        fs.write(Path::new("/app/classes/Foo.php"), "x").unwrap();
        fs.delete(Path::new("/app/classes/Foo.php")).unwrap();

        assert!(!fs.exists(Path::new("/app/classes/Foo.php")));
        assert!(fs.exists(Path::new("/app/classes")));
        assert!(fs.delete(Path::new("/app/classes/Foo.php")).is_err());
    }

    #[test]
    fn clones_share_contents() {
        let fs = MemoryFilesystem::new();
        let other = fs.clone();
        fs.write(Path::new("/a.php"), "x").unwrap();
        assert_eq!(other.list_files(), vec![PathBuf::from("/a.php")]);
    }
}
