//! `stencil module`: generate the skeleton of a new module.

use tracing::instrument;

use stencil_core::prelude::*;

use crate::{
    cli::{GenerateArgs, GlobalArgs, ModuleArgs},
    commands::generate::Session,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Skeleton files relative to the module root, with their templates.
/// `{name}` stands for the module name.
const SKELETON: &[(&str, &str)] = &[
    ("init.php", "module/init"),
    ("README.md", "module/readme"),
    ("LICENSE", "module/license"),
    ("guide/{name}/menu.md", "module/guide/menu"),
    ("guide/{name}/index.md", "module/guide/index"),
    ("guide/{name}/start.md", "module/guide/start"),
    ("config/userguide.php", "module/userguide"),
];

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(
    args: ModuleArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let generate = GenerateArgs::from(&args);
    let session = Session::open(config)?;
    let mut builder = session.env.build();
    let defaults = session.defaults(&generate, "module")?;
    session.apply(&mut builder, &generate, defaults);

    plan(&mut builder, &args.name)?;
    session.run(&mut builder, &generate, &global, &output)
}

pub(crate) fn plan(builder: &mut Builder, name: &str) -> CliResult<()> {
    for (file, template) in SKELETON {
        let file = file.replace("{name}", name);
        builder.add_task("file", Some(&file))?;
        builder.call("folder", &[Literal::from("")])?;
        builder.call("template", &[Literal::from(*template)])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session_in(root: &TempDir) -> Session {
        let mut config = AppConfig::default();
        config.paths.app_root = root.path().join("application");
        config.paths.modules_root = root.path().join("modules");
        config.paths.sources = Vec::new();
        config.paths.config_dirs = Vec::new();
        Session::open(config).unwrap()
    }

    fn module_args(name: &str) -> ModuleArgs {
        ModuleArgs {
            name: name.into(),
            pretend: false,
            force: false,
            remove: false,
            path: None,
            defaults: None,
            yes: false,
        }
    }

    #[test]
    fn skeleton_lands_in_the_new_module() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();
        let args = module_args("blog");
        session.apply(&mut builder, &GenerateArgs::from(&args), Params::new());

        plan(&mut builder, &args.name).unwrap();

        let inspected = builder.inspect(true).unwrap();
        let files: Vec<_> = inspected
            .iter()
            .map(|t| t.file.clone().unwrap())
            .collect();
        let module = root.path().join("modules/blog");
        assert_eq!(files.len(), SKELETON.len());
        assert!(files.contains(&module.join("init.php")));
        assert!(files.contains(&module.join("guide/blog/menu.md")));
        assert!(files.contains(&module.join("config/userguide.php")));

        let readme = inspected
            .iter()
            .find(|t| t.file.as_deref() == Some(module.join("README.md").as_path()))
            .and_then(|t| t.rendered.as_deref())
            .unwrap();
        assert!(readme.starts_with("# blog\n"));
    }

    #[test]
    fn skeleton_is_written_without_an_existing_module_dir() {
        let root = TempDir::new().unwrap();
        let session = session_in(&root);
        let mut builder = session.env.build();
        let args = module_args("shop");
        session.apply(&mut builder, &GenerateArgs::from(&args), Params::new());

        plan(&mut builder, &args.name).unwrap();
        builder.execute(Command::Create).unwrap();

        let init = std::fs::read_to_string(root.path().join("modules/shop/init.php")).unwrap();
        assert!(init.contains("the shop module"));
        assert!(root.path().join("modules/shop/guide/shop/start.md").is_file());
    }
}
