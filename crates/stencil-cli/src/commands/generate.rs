//! Shared plumbing for the generating commands.
//!
//! Builds the environment from configuration, applies the common options to
//! a builder, runs it and reports the action log.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use stencil_adapters::{
    FileConfigSource, HandlebarsRenderer, LocalFilesystem, ModuleMap, SourceScanner,
};
use stencil_core::prelude::*;

use crate::{
    cli::{GenerateArgs, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Everything a command needs to drive a builder.
pub struct Session {
    pub env: Environment,
    pub paths: ModuleMap,
    pub config: AppConfig,
}

impl Session {
    /// Wire the adapters named by `config`.
    #[instrument(skip_all)]
    pub fn open(config: AppConfig) -> CliResult<Self> {
        let mut paths = ModuleMap::new(&config.paths.app_root, &config.paths.modules_root);
        for (name, path) in &config.paths.modules {
            paths = paths.with_module(name.clone(), path.clone());
        }

        let mut renderer = HandlebarsRenderer::new()?;
        if let Some(dir) = &config.paths.templates {
            let count = renderer.load_dir(dir)?;
            debug!(dir = %dir.display(), count, "Loaded custom templates");
        }

        let env = Environment::new(
            Arc::new(LocalFilesystem::new()),
            Arc::new(renderer),
            Arc::new(paths.clone()),
            Arc::new(SourceScanner::new(config.paths.sources.iter().cloned())),
            Arc::new(FileConfigSource::new(config.paths.config_dirs.iter().cloned())),
        );

        Ok(Self { env, paths, config })
    }

    /// Generator defaults for `kind` from the configured or given source.
    pub fn defaults(&self, args: &GenerateArgs, kind: &str) -> CliResult<Params> {
        let source = args
            .defaults
            .as_deref()
            .unwrap_or(&self.config.generator.defaults_source);
        Ok(self.env.config_defaults(source, kind)?)
    }

    /// Apply the builder-wide options.
    pub fn apply(&self, builder: &mut Builder, args: &GenerateArgs, defaults: Params) {
        if let Some(module) = &args.module {
            builder.with_module(module.clone());
        }
        if let Some(path) = &args.path {
            builder.with_path(path.clone());
        }
        builder
            .with_pretend(args.pretend)
            .with_force(args.force)
            .with_verify(self.config.generator.verify_modules && !args.no_verify)
            .with_defaults(defaults);
    }

    /// Run `builder` and print what it did.
    #[instrument(skip_all, fields(tasks = builder.len(), remove = args.remove))]
    pub fn run(
        &self,
        builder: &mut Builder,
        args: &GenerateArgs,
        global: &GlobalArgs,
        output: &OutputManager,
    ) -> CliResult<()> {
        let command = if args.remove {
            Command::Remove
        } else {
            Command::Create
        };

        if command == Command::Remove && !args.pretend && !args.yes {
            self.confirm_removal(builder, global, output)?;
        }

        let result = builder.execute(command).map(|_| ());

        // tasks that ran before a failure still report their actions
        output.log(&builder.get_log(), &self.paths)?;
        result?;

        if args.pretend {
            output.info("Pretend mode: no files were changed")?;
        }
        info!(command = %command, actions = builder.get_log().len(), "Generation finished");
        Ok(())
    }

    fn confirm_removal(
        &self,
        builder: &mut Builder,
        global: &GlobalArgs,
        output: &OutputManager,
    ) -> CliResult<()> {
        let files: Vec<String> = builder
            .generators()?
            .iter()
            .filter_map(|task| task.file())
            .map(|file| self.paths.display(file))
            .collect();

        if global.quiet || !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            return Err(CliError::ConfirmationRequired {
                action: "remove files".into(),
            });
        }

        output.header("Files to remove")?;
        for file in &files {
            output.print(&format!("  {file}"))?;
        }

        if confirm(&format!("Remove {} file(s)?", files.len()))? {
            Ok(())
        } else {
            Err(CliError::Cancelled)
        }
    }
}

#[cfg(feature = "interactive")]
fn confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(_prompt: &str) -> CliResult<bool> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}
