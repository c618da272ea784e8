//! File-backed configuration and message lookups.
//!
//! A source is either a path to a `.toml`/`.json` file, or a bare name
//! searched as `<name>.toml` then `<name>.json` in each search directory.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use stencil_core::{
    application::{ApplicationError, ports::ConfigSource},
    error::StencilResult,
};

const EXTENSIONS: [&str; 2] = ["toml", "json"];

#[derive(Debug, Clone, Default)]
pub struct FileConfigSource {
    search_dirs: Vec<PathBuf>,
}

impl FileConfigSource {
    pub fn new(search_dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// File backing `source`, if any.
    pub fn locate(&self, source: &str) -> Option<PathBuf> {
        let direct = Path::new(source);
        if direct.extension().is_some() {
            return direct.is_file().then(|| direct.to_path_buf());
        }

        self.search_dirs.iter().find_map(|dir| {
            EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{source}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }

    fn load(&self, source: &str, path: &Path) -> StencilResult<Value> {
        let lookup_error = |reason: String| ApplicationError::ConfigLookup {
            source_name: source.to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| lookup_error(format!("{}: {e}", path.display())))?;

        let value = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .map_err(|e| lookup_error(format!("{}: {e}", path.display())))?,
            _ => toml::from_str(&raw)
                .map_err(|e| lookup_error(format!("{}: {e}", path.display())))?,
        };
        Ok(value)
    }
}

impl ConfigSource for FileConfigSource {
    #[instrument(skip(self))]
    fn get(&self, source: &str, key: Option<&str>) -> StencilResult<Option<Value>> {
        let Some(path) = self.locate(source) else {
            debug!("Config source not found");
            return Ok(None);
        };

        let document = self.load(source, &path)?;
        let mut current = &document;
        if let Some(key) = key {
            for segment in key.split('.').filter(|s| !s.is_empty()) {
                match current.get(segment) {
                    Some(next) => current = next,
                    None => return Ok(None),
                }
            }
        }
        Ok(Some(current.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stencil_core::error::StencilError;
    use tempfile::TempDir;

    #[test]
    fn named_sources_are_searched_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(
            second.path().join("generator.toml"),
            "[defaults.class]\nauthor = \"Zeebee\"\nlicense = \"BSD\"\n",
        )
        .unwrap();

        let source = FileConfigSource::new([first.path(), second.path()]);
        assert_eq!(
            source.get("generator", Some("defaults.class")).unwrap(),
            Some(json!({"author": "Zeebee", "license": "BSD"}))
        );
        assert_eq!(
            source.get("generator", Some("defaults.class.author")).unwrap(),
            Some(json!("Zeebee"))
        );
        assert_eq!(source.get("generator", Some("defaults.nope")).unwrap(), None);
        assert_eq!(source.get("missing", None).unwrap(), None);
    }

    #[test]
    fn json_files_by_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("site.json");
        std::fs::write(&file, r#"{"cache": {"driver": "file"}}"#).unwrap();

        let source = FileConfigSource::default();
        let path = file.display().to_string();
        assert_eq!(
            source.get(&path, Some("cache.driver")).unwrap(),
            Some(json!("file"))
        );
    }

    #[test]
    fn malformed_sources_fail() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("broken.toml"), "this is = = not toml").unwrap();

        let err = FileConfigSource::new([temp.path()])
            .get("broken", None)
            .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::ConfigLookup { .. })
        ));
    }
}
