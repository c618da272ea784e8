//! Generation task - one artifact and its lifecycle.
//!
//! A task is created unprepared. Its owning builder pushes inherited settings
//! into it during `prepare()`, after which `create()` or `remove()` act on the
//! artifact store and record what they did in the task's log.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::args;
use crate::{
    application::{
        ApplicationError,
        ports::Params,
        services::{BuilderId, Environment},
    },
    domain::{Command, DomainError, Literal, LogEntry, naming},
    error::StencilResult,
};

/// Kind-specific behavior of a task.
///
/// Implementations hold the kind's own options (`extend`, `source`, ...)
/// and turn them into template parameters.
pub trait TaskKind: Send + Sync + fmt::Debug {
    /// Registered kind name (`class`, `clone`, ...).
    fn kind(&self) -> &'static str;

    /// Folder under the base directory where artifacts of this kind live.
    fn folder(&self) -> &'static str {
        "classes"
    }

    /// Default template id. `None` means the task emits its `content`
    /// parameter verbatim.
    fn template(&self) -> Option<&'static str>;

    /// File name relative to the folder.
    fn file_name(&self, name: &str) -> PathBuf {
        naming::class_to_path(name)
    }

    /// Whether `operation` is one of this kind's options.
    fn supports(&self, operation: &str) -> bool;

    /// Apply or read one of this kind's options.
    fn invoke(&mut self, operation: &str, args: &[Literal])
    -> Result<Option<Literal>, DomainError>;

    /// Template parameters contributed by this kind.
    fn params(&self, name: &str, env: &Environment) -> StencilResult<Params>;
}

/// Operations every task understands, regardless of kind.
const COMMON_OPERATIONS: [&str; 10] = [
    "name", "file", "folder", "module", "path", "template", "pretend", "force", "verify",
    "defaults",
];

/// A value set on the task itself, or pushed down from the builder.
#[derive(Debug, Clone, PartialEq)]
struct Setting<T> {
    explicit: Option<T>,
    inherited: Option<T>,
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Self {
            explicit: None,
            inherited: None,
        }
    }
}

impl<T> Setting<T> {
    fn get(&self) -> Option<&T> {
        self.explicit.as_ref().or(self.inherited.as_ref())
    }

    fn set(&mut self, value: T) {
        self.explicit = Some(value);
    }

    fn inherit(&mut self, value: T) {
        self.inherited = Some(value);
    }
}

/// One artifact to generate or remove.
#[derive(Debug)]
pub struct Task {
    kind: Box<dyn TaskKind>,
    name: Option<String>,
    file: Option<PathBuf>,
    guessed: Option<PathBuf>,
    folder: Option<String>,
    module: Setting<String>,
    path: Setting<PathBuf>,
    template: Setting<String>,
    pretend: Setting<bool>,
    force: Setting<bool>,
    verify: Setting<bool>,
    defaults: Params,
    inherited_defaults: Params,
    owner: Option<BuilderId>,
    log: Vec<LogEntry>,
}

impl Task {
    pub fn new(kind: Box<dyn TaskKind>, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            file: None,
            guessed: None,
            folder: None,
            module: Setting::default(),
            path: Setting::default(),
            template: Setting::default(),
            pretend: Setting::default(),
            force: Setting::default(),
            verify: Setting::default(),
            defaults: Params::new(),
            inherited_defaults: Params::new(),
            owner: None,
            log: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn kind_name(&self) -> &'static str {
        self.kind.kind()
    }

    pub fn kind(&self) -> &dyn TaskKind {
        self.kind.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Target path: the explicit one, else the last guess.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref().or(self.guessed.as_deref())
    }

    pub fn has_explicit_file(&self) -> bool {
        self.file.is_some()
    }

    /// Set an explicit target path. It is never replaced by a guess.
    pub fn set_file(&mut self, file: impl Into<PathBuf>) -> &mut Self {
        self.file = Some(file.into());
        self
    }

    pub fn folder(&self) -> &str {
        self.folder.as_deref().unwrap_or(self.kind.folder())
    }

    pub fn set_folder(&mut self, folder: impl Into<String>) -> &mut Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn module(&self) -> Option<&str> {
        self.module.get().map(String::as_str)
    }

    pub fn set_module(&mut self, module: impl Into<String>) -> &mut Self {
        self.module.set(module.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.get().map(PathBuf::as_path)
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.path.set(path.into());
        self
    }

    /// Effective template id: set on the task, inherited, or the kind's own.
    pub fn template(&self) -> Option<&str> {
        self.template
            .get()
            .map(String::as_str)
            .or(self.kind.template())
    }

    pub fn set_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.template.set(template.into());
        self
    }

    pub fn is_pretend(&self) -> bool {
        self.pretend.get().copied().unwrap_or(false)
    }

    pub fn set_pretend(&mut self, pretend: bool) -> &mut Self {
        self.pretend.set(pretend);
        self
    }

    pub fn is_force(&self) -> bool {
        self.force.get().copied().unwrap_or(false)
    }

    pub fn set_force(&mut self, force: bool) -> &mut Self {
        self.force.set(force);
        self
    }

    pub fn verify(&self) -> bool {
        self.verify.get().copied().unwrap_or(true)
    }

    pub fn set_verify(&mut self, verify: bool) -> &mut Self {
        self.verify.set(verify);
        self
    }

    /// Effective defaults: inherited values overlaid by the task's own.
    pub fn defaults(&self) -> Params {
        let mut merged = self.inherited_defaults.clone();
        for (key, value) in &self.defaults {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Merge `defaults` into the task's own defaults.
    pub fn set_defaults(&mut self, defaults: Params) -> &mut Self {
        self.defaults.extend(defaults);
        self
    }

    /// Builder this task belongs to.
    pub fn owner(&self) -> Option<BuilderId> {
        self.owner
    }

    /// Actions recorded so far, in order.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    // -------------------------------------------------------------------------
    // Inheritance (driven by the builder)
    // -------------------------------------------------------------------------

    pub(crate) fn bind(&mut self, owner: BuilderId) {
        self.owner = Some(owner);
    }

    pub(crate) fn inherit_module(&mut self, module: &str) {
        self.module.inherit(module.to_string());
    }

    pub(crate) fn inherit_path(&mut self, path: &Path) {
        self.path.inherit(path.to_path_buf());
    }

    pub(crate) fn inherit_template(&mut self, template: &str) {
        self.template.inherit(template.to_string());
    }

    pub(crate) fn inherit_pretend(&mut self, pretend: bool) {
        self.pretend.inherit(pretend);
    }

    pub(crate) fn inherit_force(&mut self, force: bool) {
        self.force.inherit(force);
    }

    pub(crate) fn inherit_verify(&mut self, verify: bool) {
        self.verify.inherit(verify);
    }

    pub(crate) fn inherit_defaults(&mut self, defaults: &Params) {
        self.inherited_defaults = defaults.clone();
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    /// Compute the target path from the task's settings and remember it.
    ///
    /// The base is the module directory when a module is set, else the custom
    /// path, else the application root; the kind's folder and file name are
    /// appended.
    pub fn guess_filename(&mut self, env: &Environment) -> StencilResult<PathBuf> {
        let name = self
            .name
            .as_deref()
            .ok_or(DomainError::MissingRequiredField { field: "name" })?;

        let base = match self.module.get() {
            Some(module) => env
                .paths()
                .module_path(module, self.verify(), self.path())?,
            None => match self.path.get() {
                Some(path) => path.clone(),
                None => env.paths().app_root(),
            },
        };

        let mut file = base;
        let folder = self.folder();
        if !folder.is_empty() {
            file.push(folder);
        }
        file.push(self.kind.file_name(name));

        debug!(file = %file.display(), "Guessed filename");
        self.guessed = Some(file.clone());
        Ok(file)
    }

    /// Template parameters: effective defaults, then `name` and `module`,
    /// then the kind's.
    pub fn params(&self, env: &Environment) -> StencilResult<Params> {
        let name = self
            .name
            .as_deref()
            .ok_or(DomainError::MissingRequiredField { field: "name" })?;

        let mut params = self.defaults();
        params.insert("name".into(), Value::String(name.to_string()));
        if let Some(module) = self.module() {
            params.insert("module".into(), Value::String(module.to_string()));
        }
        params.extend(self.kind.params(name, env)?);
        Ok(params)
    }

    /// Render the artifact's content. Does not touch the store.
    pub fn render(&self, env: &Environment) -> StencilResult<String> {
        let params = self.params(env)?;

        // content-only kinds render a template only when the task names one
        if self.kind.template().is_none() && self.template.explicit.is_none() {
            return Ok(params
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string());
        }

        match self.template() {
            Some(template) => env.renderer().render(template, &params),
            None => Ok(String::new()),
        }
    }

    /// Render and write the artifact unless in pretend mode.
    #[instrument(skip_all, fields(kind = self.kind.kind(), name = ?self.name))]
    pub fn create(&mut self, env: &Environment) -> StencilResult<()> {
        let file = self.target(env)?;
        let content = self.render(env)?;
        let store = env.store();

        if store.exists(&file) && !self.is_force() {
            return Err(ApplicationError::ArtifactExists { path: file }.into());
        }

        let new_dir = file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty() && !store.exists(dir))
            .map(Path::to_path_buf);

        if self.is_pretend() {
            debug!(file = %file.display(), "Pretend mode, skipping write");
        } else {
            store.write(&file, &content)?;
            info!(file = %file.display(), "Created");
        }

        if let Some(dir) = new_dir {
            self.log.push(LogEntry::new(Command::Create, dir));
        }
        self.log.push(LogEntry::new(Command::Create, file));
        Ok(())
    }

    /// Delete the artifact unless in pretend mode. A missing artifact is
    /// not an error.
    #[instrument(skip_all, fields(kind = self.kind.kind(), name = ?self.name))]
    pub fn remove(&mut self, env: &Environment) -> StencilResult<()> {
        let file = self.target(env)?;
        let store = env.store();

        if self.is_pretend() {
            debug!(file = %file.display(), "Pretend mode, skipping delete");
        } else if store.exists(&file) {
            store.delete(&file)?;
            info!(file = %file.display(), "Removed");
        } else {
            debug!(file = %file.display(), "Nothing to remove");
        }

        self.log.push(LogEntry::new(Command::Remove, file));
        Ok(())
    }

    pub fn execute(&mut self, command: Command, env: &Environment) -> StencilResult<()> {
        match command {
            Command::Create => self.create(env),
            Command::Remove => self.remove(env),
        }
    }

    fn target(&mut self, env: &Environment) -> StencilResult<PathBuf> {
        match self.file() {
            Some(file) => Ok(file.to_path_buf()),
            None => self.guess_filename(env),
        }
    }

    // -------------------------------------------------------------------------
    // Dynamic operations
    // -------------------------------------------------------------------------

    /// Whether `operation` can be invoked on this task.
    pub fn supports(&self, operation: &str) -> bool {
        let operation = operation.to_ascii_lowercase();
        COMMON_OPERATIONS.contains(&operation.as_str()) || self.kind.supports(&operation)
    }

    /// Invoke a named operation. Setters return `None`; calling a value
    /// operation without arguments reads it back.
    pub fn invoke(&mut self, operation: &str, args: &[Literal]) -> StencilResult<Option<Literal>> {
        let op = operation.to_ascii_lowercase();
        let text = |value: Option<&str>| value.map(Literal::from);

        match op.as_str() {
            "name" => match args::optional_text(&op, args)? {
                Some(name) => {
                    self.set_name(name);
                    Ok(None)
                }
                None => Ok(text(self.name())),
            },
            "file" => match args::optional_text(&op, args)? {
                Some(file) => {
                    self.set_file(file);
                    Ok(None)
                }
                None => Ok(self.file().map(|f| Literal::from(f.display().to_string()))),
            },
            "folder" => match args::optional_text(&op, args)? {
                Some(folder) => {
                    self.set_folder(folder);
                    Ok(None)
                }
                None => Ok(Some(Literal::from(self.folder()))),
            },
            "module" => match args::optional_text(&op, args)? {
                Some(module) => {
                    self.set_module(module);
                    Ok(None)
                }
                None => Ok(text(self.module())),
            },
            "path" => match args::optional_text(&op, args)? {
                Some(path) => {
                    self.set_path(path);
                    Ok(None)
                }
                None => Ok(self.path().map(|p| Literal::from(p.display().to_string()))),
            },
            "template" => match args::optional_text(&op, args)? {
                Some(template) => {
                    self.set_template(template);
                    Ok(None)
                }
                None => Ok(text(self.template())),
            },
            "pretend" => {
                self.set_pretend(args::flag(&op, args)?);
                Ok(None)
            }
            "force" => {
                self.set_force(args::flag(&op, args)?);
                Ok(None)
            }
            "verify" => {
                self.set_verify(args::flag(&op, args)?);
                Ok(None)
            }
            "defaults" => match args.first() {
                None => Ok(Some(Literal::from_json(&Value::Object(self.defaults())))),
                Some(value) => match value.to_json() {
                    Value::Object(map) => {
                        self.set_defaults(map);
                        Ok(None)
                    }
                    Value::Array(items) if items.is_empty() => Ok(None),
                    _ => Err(DomainError::InvalidArgument {
                        operation: op,
                        reason: "expected an associative array".into(),
                    }
                    .into()),
                },
            },
            _ if self.kind.supports(&op) => Ok(self.kind.invoke(&op, args)?),
            _ => Err(DomainError::UndefinedOperation {
                operation: operation.to_string(),
                target: format!("{} task", self.kind.kind()),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockArtifactStore;
    use crate::application::tasks::kinds::{ClassKind, FileKind};
    use crate::error::StencilError;
    use crate::testing;
    use std::sync::Arc;

    fn class(name: &str) -> Task {
        Task::new(Box::new(ClassKind::default()), Some(name))
    }

    #[test]
    fn guessed_path_uses_app_root_and_folder() {
        let env = testing::env();
        let mut task = class("Model_Post");
        let file = task.guess_filename(&env).unwrap();
        assert_eq!(file, Path::new("/app/classes/Model/Post.php"));
        assert_eq!(task.file(), Some(file.as_path()));
    }

    #[test]
    fn guessed_path_prefers_module_then_custom_path() {
        let env = testing::env();

        let mut task = class("Foo");
        task.set_module("blog");
        assert_eq!(
            task.guess_filename(&env).unwrap(),
            Path::new("/modules/blog/classes/Foo.php")
        );

        let mut task = class("Foo");
        task.set_path("/srv/custom");
        assert_eq!(
            task.guess_filename(&env).unwrap(),
            Path::new("/srv/custom/classes/Foo.php")
        );
    }

    #[test]
    fn unverified_module_skips_lookup() {
        let env = testing::env();
        let mut task = class("Foo");
        task.set_module("ghost");
        assert!(matches!(
            task.guess_filename(&env),
            Err(StencilError::Domain(DomainError::ModuleNotFound { .. }))
        ));

        task.set_verify(false);
        assert_eq!(
            task.guess_filename(&env).unwrap(),
            Path::new("/modules/ghost/classes/Foo.php")
        );
    }

    #[test]
    fn nameless_task_cannot_guess() {
        let env = testing::env();
        let mut task = Task::new(Box::new(ClassKind::default()), None);
        assert_eq!(
            task.guess_filename(&env).unwrap_err(),
            StencilError::Domain(DomainError::MissingRequiredField { field: "name" })
        );
    }

    #[test]
    fn explicit_settings_win_over_inherited() {
        let mut task = class("Foo");
        task.inherit_pretend(true);
        assert!(task.is_pretend());
        task.set_pretend(false);
        task.inherit_pretend(true);
        assert!(!task.is_pretend());

        task.inherit_module("shared");
        assert_eq!(task.module(), Some("shared"));
        task.set_module("blog");
        assert_eq!(task.module(), Some("blog"));
    }

    #[test]
    fn task_defaults_win_on_collision() {
        let mut task = class("Foo");
        let mut own = Params::new();
        own.insert("author".into(), "task".into());
        task.set_defaults(own);

        let mut inherited = Params::new();
        inherited.insert("author".into(), "builder".into());
        inherited.insert("license".into(), "BSD".into());
        task.inherit_defaults(&inherited);

        let defaults = task.defaults();
        assert_eq!(defaults["author"], "task");
        assert_eq!(defaults["license"], "BSD");
    }

    #[test]
    fn create_logs_directory_then_file() {
        let env = testing::env();
        let mut task = class("Foo");
        task.create(&env).unwrap();

        assert_eq!(
            task.log(),
            &[
                LogEntry::new(Command::Create, "/app/classes"),
                LogEntry::new(Command::Create, "/app/classes/Foo.php"),
            ]
        );
        assert!(env.store().exists(Path::new("/app/classes/Foo.php")));
    }

    #[test]
    fn failed_write_leaves_the_log_empty() {
        let mut store = MockArtifactStore::new();
        store.expect_exists().return_const(false);
        store
            .expect_write()
            .times(1)
            .returning(|_, _| Err(ApplicationError::StoreLockError.into()));

        let env = testing::env_with_store(Arc::new(store));
        let mut task = class("Foo");
        assert!(task.create(&env).is_err());
        assert!(task.log().is_empty());
    }

    #[test]
    fn create_refuses_to_overwrite_without_force() {
        let env = testing::env();
        let mut first = class("Foo");
        first.create(&env).unwrap();

        let mut second = class("Foo");
        assert!(matches!(
            second.create(&env),
            Err(StencilError::Application(ApplicationError::ArtifactExists { .. }))
        ));
        assert!(second.log().is_empty());

        second.set_force(true);
        second.create(&env).unwrap();
        assert_eq!(
            second.log(),
            &[LogEntry::new(Command::Create, "/app/classes/Foo.php")]
        );
    }

    #[test]
    fn remove_logs_even_when_missing() {
        let env = testing::env();
        let mut task = class("Foo");
        task.remove(&env).unwrap();
        assert_eq!(
            task.log(),
            &[LogEntry::new(Command::Remove, "/app/classes/Foo.php")]
        );
    }

    #[test]
    fn remove_deletes_existing_artifact() {
        let env = testing::env();
        let mut task = class("Foo");
        task.create(&env).unwrap();
        task.remove(&env).unwrap();
        assert!(!env.store().exists(Path::new("/app/classes/Foo.php")));
    }

    #[test]
    fn file_kind_emits_content_verbatim() {
        let env = testing::env();
        let mut task = Task::new(Box::new(FileKind::default()), Some("notes.txt"));
        task.invoke("content", &[Literal::from("hello")]).unwrap();
        assert_eq!(task.render(&env).unwrap(), "hello");
    }

    #[test]
    fn file_kind_renders_an_explicit_template() {
        let env = testing::env();
        let mut task = Task::new(Box::new(FileKind::default()), Some("README.md"));
        task.inherit_template("class");
        task.set_module("blog");
        assert_eq!(task.render(&env).unwrap(), "");

        task.set_template("module/readme");
        let rendered = task.render(&env).unwrap();
        assert!(rendered.starts_with("module/readme:"));
        assert!(rendered.contains(r#""module":"blog""#));
    }

    #[test]
    fn invoke_sets_and_reads_common_operations() {
        let mut task = class("Foo");
        assert!(task.supports("Module"));
        assert!(task.supports("extend"));
        assert!(!task.supports("explode"));

        assert_eq!(task.invoke("module", &[Literal::from("blog")]).unwrap(), None);
        assert_eq!(
            task.invoke("module", &[]).unwrap(),
            Some(Literal::from("blog"))
        );
        assert_eq!(task.invoke("force", &[]).unwrap(), None);
        assert!(task.is_force());
        assert_eq!(
            task.invoke("name", &[]).unwrap(),
            Some(Literal::from("Foo"))
        );
    }

    #[test]
    fn invoke_rejects_unknown_operations() {
        let mut task = class("Foo");
        let err = task.invoke("explode", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Method explode() is not defined for class task");
    }

    #[test]
    fn render_is_pure() {
        let env = testing::env();
        let task = class("Foo");
        let first = task.render(&env).unwrap();
        assert_eq!(task.render(&env).unwrap(), first);
        assert!(task.log().is_empty());
        assert!(!env.store().exists(Path::new("/app/classes/Foo.php")));
    }
}
