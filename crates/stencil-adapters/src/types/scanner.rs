//! Type definitions read from PHP sources on disk.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use stencil_core::{
    application::{ApplicationError, ports::TypeSource},
    domain::TypeDefinition,
    error::StencilResult,
};

use super::parser::parse_source;

/// Scans `*.php` files under a set of directories for type declarations.
///
/// The scan runs once, on first lookup. Files that cannot be read or parsed
/// are skipped with a `WARN` log. When two files declare the same type, the
/// one in the earlier directory wins.
#[derive(Debug)]
pub struct SourceScanner {
    dirs: Vec<PathBuf>,
    index: OnceLock<HashMap<String, TypeDefinition>>,
}

impl SourceScanner {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            index: OnceLock::new(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of types found across all directories.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    /// Names of all types found, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.index().values().map(|def| def.name.clone()).collect();
        names.sort();
        names
    }

    fn index(&self) -> &HashMap<String, TypeDefinition> {
        self.index.get_or_init(|| self.scan())
    }

    #[instrument(skip(self), fields(dirs = self.dirs.len()))]
    fn scan(&self) -> HashMap<String, TypeDefinition> {
        let mut index = HashMap::new();

        for dir in &self.dirs {
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "skipping missing source directory");
                continue;
            }

            let files = WalkDir::new(dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "php"));

            for entry in files {
                match scan_file(entry.path()) {
                    Ok(types) => {
                        for def in types {
                            index.entry(def.name.to_ascii_lowercase()).or_insert(def);
                        }
                    }
                    Err(e) => {
                        warn!(
                            file  = %entry.path().display(),
                            error = %e,
                            "skipping unreadable source file"
                        );
                    }
                }
            }
        }

        debug!(count = index.len(), "finished scanning sources");
        index
    }
}

/// Read and parse one source file.
pub fn scan_file(path: &Path) -> StencilResult<Vec<TypeDefinition>> {
    let unreadable = |reason: String| ApplicationError::SourceUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let src = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    Ok(parse_source(&src, Some(path)).map_err(|e| unreadable(e.to_string()))?)
}

impl TypeSource for SourceScanner {
    fn find(&self, name: &str) -> StencilResult<Option<TypeDefinition>> {
        Ok(self.index().get(&name.to_ascii_lowercase()).cloned())
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.index()
            .get(&name.to_ascii_lowercase())
            .and_then(|def| def.file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{domain::TypeKind, error::StencilError};
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn finds_types_case_insensitively() {
        let temp = TempDir::new().unwrap();
        let file = write(
            temp.path(),
            "classes/Kohana/Cache.php",
            "<?php\nabstract class Kohana_Cache {\n\tconst DEFAULT_EXPIRE = 3600;\n}\n",
        );
        write(
            temp.path(),
            "classes/Cache.php",
            "<?php\nabstract class Cache extends Kohana_Cache {}\n",
        );
        write(temp.path(), "classes/README.md", "class NotPhp {}");

        let scanner = SourceScanner::new([temp.path()]);
        let def = scanner.find("kohana_cache").unwrap().unwrap();
        assert_eq!(def.name, "Kohana_Cache");
        assert_eq!(def.kind, TypeKind::Class);
        assert_eq!(def.file.as_deref(), Some(file.as_path()));

        assert_eq!(scanner.locate("KOHANA_CACHE"), Some(file));
        assert_eq!(scanner.type_names(), vec!["Cache", "Kohana_Cache"]);
        assert!(scanner.find("NotPhp").unwrap().is_none());
    }

    #[test]
    fn earlier_directories_win() {
        let app = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        write(app.path(), "classes/Url.php", "<?php class URL { const APP = 1; }");
        write(system.path(), "classes/Url.php", "<?php class URL { const SYSTEM = 1; }");

        let scanner = SourceScanner::new([app.path(), system.path()]);
        let def = scanner.find("URL").unwrap().unwrap();
        assert_eq!(def.constants[0].name, "APP");
    }

    #[test]
    fn broken_files_and_missing_dirs_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "classes/Broken.php", "<?php class Broken { public $x;");
        write(temp.path(), "classes/Fine.php", "<?php interface Fine {}");

        let scanner = SourceScanner::new([temp.path().join("missing"), temp.path().to_path_buf()]);
        assert_eq!(scanner.len(), 1);
        assert!(scanner.find("Fine").unwrap().is_some());
        assert!(scanner.find("Broken").unwrap().is_none());
    }

    #[test]
    fn truncated_method_does_not_hide_other_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Half.php", "<?php class Half { public function save(");
        write(temp.path(), "Fine.php", "<?php class Fine {}");

        let scanner = SourceScanner::new([temp.path()]);
        assert!(scanner.find("Fine").unwrap().is_some());
        assert!(scanner.find("Half").unwrap().is_none());
        assert_eq!(scanner.locate("Half"), None);
    }

    #[test]
    fn malformed_declarations_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "Body.php",
            "<?php class Body {\n\tpublic function run() {\n\t\treturn 1;\n",
        );
        write(
            temp.path(),
            "Params.php",
            "<?php class Params {\n\tpublic function find($id, array $opts = array(\n}\n",
        );
        write(
            temp.path(),
            "Literal.php",
            "<?php class Literal {\n\tpublic $name = 'unclosed;\n}\n",
        );
        write(
            temp.path(),
            "Sibling.php",
            "<?php class Sibling {\n\tconst LIMIT = 10;\n\tpublic function get($key = NULL) {}\n}\n",
        );

        let scanner = SourceScanner::new([temp.path()]);
        assert_eq!(scanner.type_names(), vec!["Sibling"]);

        let sibling = scanner.find("Sibling").unwrap().unwrap();
        assert_eq!(sibling.constants[0].name, "LIMIT");
        assert_eq!(sibling.methods[0].name, "get");
    }

    #[test]
    fn scan_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "Broken.php", "<?php class Broken {");

        let err = scan_file(&path).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::SourceUnreadable { .. })
        ));
        assert!(err.to_string().contains("unterminated body of Broken"));
    }
}
