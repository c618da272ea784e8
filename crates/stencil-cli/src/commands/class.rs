//! `stencil class`: generate, stub or clone a class.

use regex::Regex;
use tracing::{debug, instrument};

use stencil_core::{
    domain::{DomainError, Member, naming},
    prelude::*,
};

use crate::{
    cli::{ClassArgs, GlobalArgs},
    commands::generate::Session,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(
    args: ClassArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(config)?;
    let mut builder = session.env.build();
    let defaults = session.defaults(&args.generate, "class")?;
    session.apply(&mut builder, &args.generate, defaults);

    plan(&session, &mut builder, &args)?;
    session.run(&mut builder, &args.generate, &global, &output)
}

/// Queue the tasks for `args` on `builder`.
pub(crate) fn plan(session: &Session, builder: &mut Builder, args: &ClassArgs) -> CliResult<()> {
    match &args.clone {
        Some(source) => plan_clone(session, builder, args, source)?,
        None => {
            builder.add_task("class", Some(&args.name))?;
            if args.is_abstract {
                builder.call("abstract", &[])?;
            }
            if let Some(parent) = &args.extend {
                builder.call("extend", &[Literal::from(parent.as_str())])?;
            }
            if let Some(interfaces) = &args.implement {
                builder.call("implement", &[Literal::from(interfaces.as_str())])?;
            }
        }
    }
    if let Some(template) = &args.generate.template {
        builder.call("template", &[Literal::from(template.as_str())])?;
    }

    if let Some(stub) = &args.stub {
        builder.add_task("class", Some(stub))?;
        builder.call("extend", &[Literal::from(args.name.as_str())])?;
        builder.call("blank", &[])?;
        if let Some(template) = &args.generate.template {
            builder.call("template", &[Literal::from(template.as_str())])?;
        }
    }

    if !args.no_test {
        let subject = args.stub.as_deref().unwrap_or(&args.name);
        builder.add_task("unittest", Some(subject))?;
        if let Some(module) = &args.generate.module {
            builder.call("group", &[Literal::from(module.as_str())])?;
        }
    }
    Ok(())
}

fn plan_clone(
    session: &Session,
    builder: &mut Builder,
    args: &ClassArgs,
    source: &str,
) -> CliResult<()> {
    let types = session.env.types();
    if types.find(source)?.is_none() {
        return Err(StencilError::from(DomainError::not_found(Member::Type {
            name: source.to_string(),
        }))
        .into());
    }

    let file = if args.reflect {
        None
    } else {
        types.locate(source)
    };

    match file {
        Some(path) => {
            debug!(source, file = %path.display(), "Copying class source");
            let original = std::fs::read_to_string(&path).map_err(|e| CliError::IoError {
                message: format!("cannot read {}", path.display()),
                source: e,
            })?;
            let content = rename(&original, source, &args.name)?;

            let target = naming::class_to_path(&args.name);
            builder.add_task("file", Some(&target.to_string_lossy()))?;
            builder.call("folder", &[Literal::from("classes")])?;
            builder.call("content", &[Literal::from(content)])?;
        }
        None => {
            debug!(source, inherit = args.inherit, "Reflecting class");
            builder.add_task("clone", Some(&args.name))?;
            builder.call("source", &[Literal::from(source)])?;
            builder.call("type", &[Literal::from("class")])?;
            if args.inherit {
                builder.call("inherit", &[])?;
            }
        }
    }
    Ok(())
}

/// Replace every whole-word occurrence of `from` with `to`.
fn rename(content: &str, from: &str, to: &str) -> CliResult<String> {
    let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(from))).map_err(|e| {
        CliError::InvalidInput {
            message: format!("cannot match class name '{from}'"),
            source: Some(Box::new(e)),
        }
    })?;
    Ok(pattern.replace_all(content, regex::NoExpand(to)).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GenerateArgs;
    use tempfile::TempDir;

    fn session_in(root: &TempDir) -> Session {
        let mut config = AppConfig::default();
        config.paths.app_root = root.path().join("application");
        config.paths.modules_root = root.path().join("modules");
        config.paths.sources = vec![root.path().join("system/classes")];
        config.paths.config_dirs = vec![root.path().join("application/config")];
        Session::open(config).unwrap()
    }

    fn class_args(name: &str) -> ClassArgs {
        ClassArgs {
            name: name.into(),
            extend: None,
            implement: None,
            is_abstract: false,
            stub: None,
            no_test: false,
            clone: None,
            reflect: false,
            inherit: false,
            generate: GenerateArgs::default(),
        }
    }

    fn kinds(builder: &Builder) -> Vec<(&'static str, Option<String>)> {
        builder
            .tasks()
            .iter()
            .map(|t| (t.kind_name(), t.name().map(str::to_string)))
            .collect()
    }

    #[test]
    fn class_comes_with_a_test_by_default() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();

        plan(&session, &mut builder, &class_args("Model_Post")).unwrap();
        assert_eq!(
            kinds(&builder),
            vec![
                ("class", Some("Model_Post".into())),
                ("unittest", Some("Model_Post".into())),
            ]
        );
    }

    #[test]
    fn stub_extends_the_class_and_gets_the_test() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();

        let mut args = class_args("Kohana_Log_Reader");
        args.stub = Some("Log_Reader".into());
        args.no_test = false;
        plan(&session, &mut builder, &args).unwrap();

        assert_eq!(
            kinds(&builder),
            vec![
                ("class", Some("Kohana_Log_Reader".into())),
                ("class", Some("Log_Reader".into())),
                ("unittest", Some("Log_Reader".into())),
            ]
        );
        let rendered = builder.inspect(true).unwrap();
        let stub = rendered[1].rendered.as_deref().unwrap();
        assert!(stub.contains("class Log_Reader extends Kohana_Log_Reader"));
    }

    #[test]
    fn template_applies_to_the_stub_too() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();

        let mut args = class_args("Kohana_Log_Reader");
        args.stub = Some("Log_Reader".into());
        args.no_test = true;
        args.generate.template = Some("clone".into());
        plan(&session, &mut builder, &args).unwrap();

        let templates: Vec<_> = builder.tasks().iter().map(|t| t.template()).collect();
        assert_eq!(templates, vec![Some("clone"), Some("clone")]);
    }

    #[test]
    fn missing_clone_source_is_not_found() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();

        let mut args = class_args("Cache_Memory");
        args.clone = Some("Kohana_Cache".into());
        let err = plan(&session, &mut builder, &args).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Class Kohana_Cache does not exist"));
    }

    #[test]
    fn plain_clone_copies_and_renames_the_source() {
        let root = TempDir::new().unwrap();
        let classes = root.path().join("system/classes/Kohana");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(
            classes.join("Cache.php"),
            "<?php\n\nabstract class Kohana_Cache {\n    public static function factory() { return new Kohana_Cache_File; }\n}\n",
        )
        .unwrap();

        let session = session_in(&root);
        let mut builder = session.env.build();
        let mut args = class_args("Cache_Memory");
        args.clone = Some("Kohana_Cache".into());
        args.no_test = true;
        plan(&session, &mut builder, &args).unwrap();

        let inspected = builder.inspect(true).unwrap();
        assert_eq!(inspected.len(), 1);
        assert_eq!(inspected[0].kind, "file");
        assert_eq!(
            inspected[0].file.as_deref(),
            Some(root.path().join("application/classes/Cache/Memory.php").as_path())
        );
        let content = inspected[0].rendered.as_deref().unwrap();
        assert!(content.contains("abstract class Cache_Memory {"));
        // longer identifiers sharing the prefix are left alone
        assert!(content.contains("new Kohana_Cache_File"));
    }

    #[test]
    fn reflected_clone_uses_the_clone_task() {
        let root = TempDir::new().unwrap();
        let classes = root.path().join("system/classes");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(classes.join("Kohana.php"), "<?php\nclass Kohana {}\n").unwrap();

        let session = session_in(&root);
        let mut builder = session.env.build();
        let mut args = class_args("Core");
        args.clone = Some("Kohana".into());
        args.reflect = true;
        args.inherit = true;
        plan(&session, &mut builder, &args).unwrap();

        assert_eq!(builder.tasks()[0].kind_name(), "clone");
    }

    #[test]
    fn rename_matches_whole_words() {
        let out = rename("class Foo extends FooBar { Foo::x(); }", "Foo", "Baz").unwrap();
        assert_eq!(out, "class Baz extends FooBar { Baz::x(); }");
    }
}
