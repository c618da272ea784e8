//! Orchestration builder - an ordered set of tasks sharing global settings.
//!
//! The builder is the driving port of the core:
//! 1. Add tasks (`add_task`, or `call("add_<kind>", ..)`)
//! 2. Configure globals (`with_module`, `with_pretend`, ...)
//! 3. `prepare()` pushes globals into tasks and fixes their target paths
//! 4. `execute()` runs create/remove on every task, in order
//! 5. `get_log()` reports what happened

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    application::{
        ports::Params,
        services::Environment,
        tasks::Task,
    },
    domain::{Command, DomainError, Literal, LogEntry},
    error::StencilResult,
};

/// Identity of a builder; tasks record it as their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BuilderId(Uuid);

impl BuilderId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings pushed into every task on `prepare()`.
///
/// Unset values are not pushed, so tasks keep their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    pub pretend: Option<bool>,
    pub force: Option<bool>,
    pub verify: Option<bool>,
    pub path: Option<PathBuf>,
    pub module: Option<String>,
    pub template: Option<String>,
    pub defaults: Params,
}

/// Debug view of one prepared task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub kind: &'static str,
    pub name: Option<String>,
    pub file: Option<PathBuf>,
    pub rendered: Option<String>,
}

/// Result of a dynamically dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// `add_<kind>` added a task at this index.
    Added(usize),
    /// The last task handled the operation.
    Forwarded(Option<Literal>),
}

/// Ordered collection of generation tasks.
#[derive(Debug)]
pub struct Builder {
    id: BuilderId,
    env: Environment,
    tasks: Vec<Task>,
    globals: Globals,
    prepared: bool,
}

impl Builder {
    pub fn new(env: Environment) -> Self {
        Self {
            id: BuilderId::new(),
            env,
            tasks: Vec::new(),
            globals: Globals::default(),
            prepared: false,
        }
    }

    pub fn id(&self) -> BuilderId {
        self.id
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks as they are, without preparing.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    /// Add a task of a registered kind.
    pub fn add_task(&mut self, kind: &str, name: Option<&str>) -> StencilResult<&mut Task> {
        let kind = self.env.registry().create(kind)?;
        debug!(kind = kind.kind(), name = ?name, "Adding task");
        Ok(self.add_existing(Task::new(kind, name)))
    }

    /// Add an already configured task and bind it to this builder.
    pub fn add_existing(&mut self, mut task: Task) -> &mut Task {
        task.bind(self.id);
        self.prepared = false;
        let index = self.tasks.len();
        self.tasks.push(task);
        &mut self.tasks[index]
    }

    /// The most recently added task. Invalidates preparation.
    pub fn last_task_mut(&mut self) -> Option<&mut Task> {
        self.prepared = false;
        self.tasks.last_mut()
    }

    /// Task at `index`. Invalidates preparation.
    pub fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.prepared = false;
        self.tasks.get_mut(index)
    }

    // -------------------------------------------------------------------------
    // Globals
    // -------------------------------------------------------------------------

    /// Replace the global defaults. An empty map leaves them unchanged.
    pub fn with_defaults(&mut self, defaults: Params) -> &mut Self {
        if !defaults.is_empty() {
            self.globals.defaults = defaults;
            self.prepared = false;
        }
        self
    }

    pub fn with_pretend(&mut self, pretend: bool) -> &mut Self {
        self.globals.pretend = Some(pretend);
        self.prepared = false;
        self
    }

    pub fn with_force(&mut self, force: bool) -> &mut Self {
        self.globals.force = Some(force);
        self.prepared = false;
        self
    }

    pub fn with_verify(&mut self, verify: bool) -> &mut Self {
        self.globals.verify = Some(verify);
        self.prepared = false;
        self
    }

    pub fn with_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.globals.path = Some(path.into());
        self.prepared = false;
        self
    }

    pub fn with_module(&mut self, module: impl Into<String>) -> &mut Self {
        self.globals.module = Some(module.into());
        self.prepared = false;
        self
    }

    pub fn with_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.globals.template = Some(template.into());
        self.prepared = false;
        self
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    /// Push globals into every task and fix target paths.
    ///
    /// A no-op until a global or the task list changes.
    #[instrument(skip(self), fields(builder = %self.id, tasks = self.tasks.len()))]
    pub fn prepare(&mut self) -> StencilResult<&mut Self> {
        if self.prepared {
            return Ok(self);
        }

        let globals = &self.globals;
        for task in &mut self.tasks {
            if let Some(module) = &globals.module {
                task.inherit_module(module);
            }
            if let Some(verify) = globals.verify {
                task.inherit_verify(verify);
            }
            if let Some(path) = &globals.path {
                task.inherit_path(path);
            }

            if !task.has_explicit_file() {
                task.guess_filename(&self.env)?;
            }

            if !globals.defaults.is_empty() {
                task.inherit_defaults(&globals.defaults);
            }
            if let Some(template) = &globals.template {
                task.inherit_template(template);
            }
            if let Some(pretend) = globals.pretend {
                task.inherit_pretend(pretend);
            }
            if let Some(force) = globals.force {
                task.inherit_force(force);
            }
        }

        self.prepared = true;
        debug!("Builder prepared");
        Ok(self)
    }

    /// Prepared tasks, in order.
    pub fn generators(&mut self) -> StencilResult<&[Task]> {
        self.prepare()?;
        Ok(&self.tasks)
    }

    /// Target file of every task, with the rendered content when `rendered`.
    pub fn inspect(&mut self, rendered: bool) -> StencilResult<Vec<Inspection>> {
        self.prepare()?;
        self.tasks
            .iter()
            .map(|task| -> StencilResult<Inspection> {
                Ok(Inspection {
                    kind: task.kind_name(),
                    name: task.name().map(str::to_string),
                    file: task.file().map(Path::to_path_buf),
                    rendered: if rendered {
                        Some(task.render(&self.env)?)
                    } else {
                        None
                    },
                })
            })
            .collect()
    }

    /// Run `command` on every task in order. The first failure aborts the
    /// remaining tasks; completed tasks keep their log entries.
    #[instrument(skip(self), fields(builder = %self.id, tasks = self.tasks.len()))]
    pub fn execute(&mut self, command: Command) -> StencilResult<&mut Self> {
        self.prepare()?;

        for task in &mut self.tasks {
            task.execute(command, &self.env)?;
        }

        info!(
            command = %command,
            entries = self.tasks.iter().map(|t| t.log().len()).sum::<usize>(),
            "Builder executed"
        );
        Ok(self)
    }

    /// Every task's log, in task order.
    pub fn get_log(&self) -> Vec<LogEntry> {
        self.tasks
            .iter()
            .flat_map(|task| task.log().iter().cloned())
            .collect()
    }

    /// Items whose log status is `remove`.
    pub fn get_removed_items(&self) -> Vec<PathBuf> {
        self.get_log()
            .into_iter()
            .filter(|entry| entry.status == Command::Remove)
            .map(|entry| entry.item)
            .collect()
    }

    /// Prepare both builders and move `other`'s tasks into this one.
    ///
    /// Globals are not merged; moved tasks keep the settings `other` gave them.
    #[instrument(skip_all, fields(builder = %self.id, other = %other.id))]
    pub fn merge(&mut self, mut other: Builder) -> StencilResult<&mut Self> {
        self.prepare()?;
        other.prepare()?;

        for mut task in other.tasks.drain(..) {
            task.bind(self.id);
            self.tasks.push(task);
        }

        debug!(tasks = self.tasks.len(), "Builders merged");
        Ok(self)
    }

    /// Dispatch a named operation.
    ///
    /// `add_<kind>` adds a task of that kind, named by the first argument.
    /// Anything else is forwarded to the last task when it supports it.
    pub fn call(&mut self, operation: &str, args: &[Literal]) -> StencilResult<CallOutcome> {
        if let Some(kind) = operation.strip_prefix("add_") {
            let name = args.first().and_then(Literal::as_text);
            self.add_task(kind, name.as_deref())?;
            return Ok(CallOutcome::Added(self.tasks.len() - 1));
        }

        match self.tasks.last_mut() {
            Some(task) if task.supports(operation) => {
                let result = task.invoke(operation, args)?;
                self.prepared = false;
                Ok(CallOutcome::Forwarded(result))
            }
            _ => Err(DomainError::UndefinedOperation {
                operation: operation.to_string(),
                target: "Builder".into(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::MockArtifactStore;
    use crate::error::StencilError;
    use crate::testing;
    use std::sync::Arc;

    #[test]
    fn unknown_kind_is_rejected() {
        let mut builder = testing::env().build();
        let err = builder.add_task("widget", Some("Foo")).unwrap_err();
        assert_eq!(
            err,
            StencilError::Domain(DomainError::UnknownType {
                kind: "widget".into()
            })
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn added_task_is_bound_to_builder() {
        let mut builder = testing::env().build();
        let id = builder.id();
        let task = builder.add_task("class", Some("Foo")).unwrap();
        assert_eq!(task.owner(), Some(id));
    }

    #[test]
    fn prepare_is_idempotent() {
        let mut builder = testing::env().build();
        builder.with_module("blog").with_pretend(true);
        builder.add_task("class", Some("Foo")).unwrap();
        builder.add_task("unittest", Some("Foo")).unwrap();

        builder.prepare().unwrap();
        let first = format!("{:?}", builder.tasks());
        builder.prepare().unwrap();
        assert_eq!(format!("{:?}", builder.tasks()), first);
        assert!(builder.is_prepared());
    }

    #[test]
    fn setters_invalidate_preparation() {
        let mut builder = testing::env().build();
        builder.add_task("class", Some("Foo")).unwrap();
        builder.prepare().unwrap();

        builder.with_force(true);
        assert!(!builder.is_prepared());
        builder.prepare().unwrap();

        builder.add_task("class", Some("Bar")).unwrap();
        assert!(!builder.is_prepared());
        builder.prepare().unwrap();

        builder.with_defaults(Params::new());
        assert!(builder.is_prepared());
    }

    #[test]
    fn prepared_tasks_have_paths() {
        let mut builder = testing::env().build();
        builder.with_module("blog");
        builder.add_task("class", Some("Model_Post")).unwrap();
        builder.add_task("controller", Some("Post")).unwrap();
        builder.add_task("unittest", Some("Model_Post")).unwrap();
        builder.add_task("config", Some("blog")).unwrap();

        let files: Vec<PathBuf> = builder
            .generators()
            .unwrap()
            .iter()
            .map(|t| t.file().unwrap().to_path_buf())
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/modules/blog/classes/Model/Post.php"),
                PathBuf::from("/modules/blog/classes/Controller/Post.php"),
                PathBuf::from("/modules/blog/tests/Model/PostTest.php"),
                PathBuf::from("/modules/blog/config/blog.php"),
            ]
        );
    }

    #[test]
    fn explicit_file_is_kept() {
        let mut builder = testing::env().build();
        builder
            .add_task("class", Some("Foo"))
            .unwrap()
            .set_file("/elsewhere/Foo.php");
        builder.with_module("blog");
        let tasks = builder.generators().unwrap();
        assert_eq!(tasks[0].file(), Some(Path::new("/elsewhere/Foo.php")));
    }

    #[test]
    fn global_defaults_merge_under_task_defaults() {
        let mut builder = testing::env().build();
        let mut own = Params::new();
        own.insert("author".into(), "task".into());
        builder
            .add_task("class", Some("Foo"))
            .unwrap()
            .set_defaults(own);
        builder.add_task("class", Some("Bar")).unwrap();

        let mut globals = Params::new();
        globals.insert("author".into(), "builder".into());
        globals.insert("license".into(), "BSD".into());
        builder.with_defaults(globals);

        let tasks = builder.generators().unwrap();
        assert_eq!(tasks[0].defaults()["author"], "task");
        assert_eq!(tasks[0].defaults()["license"], "BSD");
        assert_eq!(tasks[1].defaults()["author"], "builder");
    }

    #[test]
    fn globals_do_not_override_explicit_task_settings() {
        let mut builder = testing::env().build();
        builder
            .add_task("class", Some("Foo"))
            .unwrap()
            .set_pretend(false);
        builder.add_task("class", Some("Bar")).unwrap();
        builder.with_pretend(true);

        let tasks = builder.generators().unwrap();
        assert!(!tasks[0].is_pretend());
        assert!(tasks[1].is_pretend());
    }

    #[test]
    fn pretend_execution_writes_nothing() {
        let mut store = MockArtifactStore::new();
        store.expect_exists().return_const(false);
        store.expect_write().never();
        store.expect_delete().never();

        let env = testing::env_with_store(Arc::new(store));
        let mut builder = env.build();
        builder.with_pretend(true);
        builder.add_task("class", Some("Foo")).unwrap();
        builder.add_task("controller", Some("Foo")).unwrap();

        builder.execute(Command::Create).unwrap();

        let files: Vec<_> = builder
            .get_log()
            .into_iter()
            .filter(|e| e.status == Command::Create && e.item.extension().is_some())
            .map(|e| e.item)
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/app/classes/Foo.php"),
                PathBuf::from("/app/classes/Controller/Foo.php"),
            ]
        );
    }

    #[test]
    fn log_is_task_then_chronological() {
        let env = testing::env();
        let mut builder = env.build();
        builder.add_task("class", Some("Foo")).unwrap();
        builder.add_task("class", Some("Bar_Baz")).unwrap();

        builder.execute(Command::Create).unwrap();

        assert_eq!(
            builder.get_log(),
            vec![
                LogEntry::new(Command::Create, "/app/classes"),
                LogEntry::new(Command::Create, "/app/classes/Foo.php"),
                LogEntry::new(Command::Create, "/app/classes/Bar"),
                LogEntry::new(Command::Create, "/app/classes/Bar/Baz.php"),
            ]
        );
    }

    #[test]
    fn execute_aborts_on_first_failure() {
        let env = testing::env();
        env.store()
            .write(Path::new("/app/classes/Bar.php"), "taken")
            .unwrap();

        let mut builder = env.build();
        builder.add_task("class", Some("Foo")).unwrap();
        builder.add_task("class", Some("Bar")).unwrap();
        builder.add_task("class", Some("Baz")).unwrap();

        let err = builder.execute(Command::Create).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::ArtifactExists { .. })
        ));
        assert_eq!(
            builder.get_log(),
            vec![LogEntry::new(Command::Create, "/app/classes/Foo.php")]
        );
        assert!(!env.store().exists(Path::new("/app/classes/Baz.php")));
    }

    #[test]
    fn remove_reports_removed_items() {
        let env = testing::env();
        let mut builder = env.build();
        builder.add_task("class", Some("Foo")).unwrap();
        builder.execute(Command::Create).unwrap();

        let mut builder = env.build();
        builder.add_task("class", Some("Foo")).unwrap();
        builder.execute(Command::Remove).unwrap();

        assert_eq!(
            builder.get_removed_items(),
            vec![PathBuf::from("/app/classes/Foo.php")]
        );
        assert!(!env.store().exists(Path::new("/app/classes/Foo.php")));
    }

    #[test]
    fn merge_keeps_per_task_module() {
        let env = testing::env();
        let mut a = env.build();
        a.with_module("blog");
        a.add_task("class", Some("Foo")).unwrap();

        let mut b = env.build();
        b.with_module("news");
        b.add_task("class", Some("Bar")).unwrap();

        a.merge(b).unwrap();
        let id = a.id();
        let tasks = a.generators().unwrap();

        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.owner() == Some(id)));
        assert_eq!(tasks[0].module(), Some("blog"));
        assert_eq!(tasks[1].module(), Some("news"));
        assert_eq!(
            tasks[1].file(),
            Some(Path::new("/modules/news/classes/Bar.php"))
        );
    }

    #[test]
    fn call_without_tasks_is_undefined() {
        let mut builder = testing::env().build();
        let err = builder.call("extend", &[Literal::from("ORM")]).unwrap_err();
        assert_eq!(err.to_string(), "Method extend() is not defined for Builder");
    }

    #[test]
    fn call_adds_and_forwards() {
        let mut builder = testing::env().build();
        assert_eq!(
            builder.call("add_class", &[Literal::from("Foo")]).unwrap(),
            CallOutcome::Added(0)
        );
        assert_eq!(
            builder.call("extend", &[Literal::from("ORM")]).unwrap(),
            CallOutcome::Forwarded(None)
        );
        assert_eq!(
            builder.call("extend", &[]).unwrap(),
            CallOutcome::Forwarded(Some(Literal::from("ORM")))
        );
        assert!(!builder.is_prepared());

        // the controller-only option is not understood by a class task
        assert!(matches!(
            builder.call("action", &[Literal::from("index")]),
            Err(StencilError::Domain(DomainError::UndefinedOperation { .. }))
        ));
        assert!(matches!(
            builder.call("add_widget", &[Literal::from("Foo")]),
            Err(StencilError::Domain(DomainError::UnknownType { .. }))
        ));
    }

    #[test]
    fn inspect_renders_on_request() {
        let mut builder = testing::env().build();
        builder.add_task("class", Some("Foo")).unwrap();

        let plain = builder.inspect(false).unwrap();
        assert_eq!(plain[0].file.as_deref(), Some(Path::new("/app/classes/Foo.php")));
        assert!(plain[0].rendered.is_none());

        let rendered = builder.inspect(true).unwrap();
        assert!(rendered[0].rendered.as_deref().unwrap().starts_with("class:"));
    }
}
