//! Module and application path resolution.
//!
//! Paths can be shown relative to two symbolic roots: `APPPATH/` for the
//! application root and `MODPATH/` for the modules root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stencil_core::{application::ports::PathResolver, domain::DomainError, error::StencilResult};

pub const APP_PREFIX: &str = "APPPATH";
pub const MOD_PREFIX: &str = "MODPATH";

/// Application root, modules root, and explicitly mapped modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMap {
    app_root: PathBuf,
    modules_root: PathBuf,
    modules: BTreeMap<String, PathBuf>,
}

impl ModuleMap {
    pub fn new(app_root: impl Into<PathBuf>, modules_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            modules_root: modules_root.into(),
            modules: BTreeMap::new(),
        }
    }

    /// Map a module name to a directory outside the modules root.
    pub fn with_module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.modules.insert(name.into(), path.into());
        self
    }

    pub fn modules_root(&self) -> &Path {
        &self.modules_root
    }

    /// Mapped module names.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Shorten `path` for display with the symbolic roots.
    pub fn display(&self, path: &Path) -> String {
        let roots = [(APP_PREFIX, &self.app_root), (MOD_PREFIX, &self.modules_root)];
        for (prefix, root) in roots {
            if let Ok(rest) = path.strip_prefix(root) {
                return Path::new(prefix).join(rest).display().to_string();
            }
        }
        path.display().to_string()
    }

    /// Expand a leading symbolic root back into a real path.
    pub fn expand(&self, text: &str) -> PathBuf {
        let path = Path::new(text);
        if let Ok(rest) = path.strip_prefix(APP_PREFIX) {
            return self.app_root.join(rest);
        }
        if let Ok(rest) = path.strip_prefix(MOD_PREFIX) {
            return self.modules_root.join(rest);
        }
        path.to_path_buf()
    }
}

impl PathResolver for ModuleMap {
    fn app_root(&self) -> PathBuf {
        self.app_root.clone()
    }

    fn module_path(
        &self,
        module: &str,
        verify: bool,
        base: Option<&Path>,
    ) -> StencilResult<PathBuf> {
        // mapped modules are loaded, so they are returned as is
        if let Some(mapped) = self.modules.get(module) {
            return Ok(mapped.clone());
        }

        let path = base.unwrap_or(&self.modules_root).join(module);

        if verify && !path.is_dir() {
            return Err(DomainError::ModuleNotFound {
                module: module.to_string(),
            }
            .into());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::error::StencilError;
    use tempfile::TempDir;

    #[test]
    fn verified_modules_must_exist() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("modules/blog")).unwrap();
        let map = ModuleMap::new(temp.path().join("application"), temp.path().join("modules"));

        assert_eq!(
            map.module_path("blog", true, None).unwrap(),
            temp.path().join("modules/blog")
        );
        assert!(matches!(
            map.module_path("news", true, None),
            Err(StencilError::Domain(DomainError::ModuleNotFound { .. }))
        ));
        assert_eq!(
            map.module_path("news", false, None).unwrap(),
            temp.path().join("modules/news")
        );
    }

    #[test]
    fn mapped_modules_win_over_the_base() {
        let map = ModuleMap::new("/srv/app", "/srv/modules").with_module("auth", "/opt/auth");
        assert_eq!(
            map.module_path("auth", false, None).unwrap(),
            Path::new("/opt/auth")
        );
        // not verified, even though /opt/auth does not exist
        assert_eq!(
            map.module_path("auth", true, Some(Path::new("/tmp/out")))
                .unwrap(),
            Path::new("/opt/auth")
        );
        assert_eq!(
            map.module_path("blog", false, Some(Path::new("/tmp/out")))
                .unwrap(),
            Path::new("/tmp/out/blog")
        );
    }

    #[test]
    fn symbolic_roots() {
        let map = ModuleMap::new("/srv/app", "/srv/modules");
        assert_eq!(
            map.display(Path::new("/srv/app/classes/Foo.php")),
            "APPPATH/classes/Foo.php"
        );
        assert_eq!(
            map.display(Path::new("/srv/modules/blog/classes/Foo.php")),
            "MODPATH/blog/classes/Foo.php"
        );
        assert_eq!(map.display(Path::new("/tmp/Foo.php")), "/tmp/Foo.php");
        assert_eq!(
            map.expand("MODPATH/blog/classes"),
            Path::new("/srv/modules/blog/classes")
        );
        assert_eq!(map.expand("/tmp/x"), Path::new("/tmp/x"));
    }
}
