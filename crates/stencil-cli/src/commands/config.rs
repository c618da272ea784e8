//! `stencil config`: inspect the effective configuration.

use std::path::Path;

use serde_json::Value;

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Run a `config` subcommand against the loaded settings.
pub fn execute(
    cmd: ConfigCommands,
    config_file: Option<&Path>,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = lookup(&config, &key)?;
            output.print(&value)?;
        }

        ConfigCommands::List => {
            output.header("Effective configuration")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => match AppConfig::active_path(config_file) {
            Some(path) => output.print(&path.display().to_string())?,
            None => output.print(&format!(
                "{} (not present, using defaults)",
                AppConfig::config_path().display()
            ))?,
        },
    }

    Ok(())
}


/// Look up a dotted key. Scalars print bare, tables and lists as JSON.
fn lookup(config: &AppConfig, key: &str) -> CliResult<String> {
    let root = config.to_value()?;
    let value = key
        .split('.')
        .try_fold(&root, |current, segment| current.get(segment))
        .ok_or_else(|| CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        })?;

    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
