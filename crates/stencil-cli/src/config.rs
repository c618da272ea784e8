//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The CLI
//! layer owns it; the core crate only sees the adapters built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `STENCIL_*` environment variables, `__` between nested keys
//!    (`STENCIL_PATHS__APP_ROOT=app`)
//! 3. Config file (`--config`, else the platform config file when present)
//! 4. Built-in defaults

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where things live.
    pub paths: PathsConfig,
    /// Generator behaviour.
    pub generator: GeneratorConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Application root; files without a module go here.
    pub app_root: PathBuf,
    /// Directory holding one subdirectory per module.
    pub modules_root: PathBuf,
    /// Modules living outside `modules_root`.
    #[serde(default)]
    pub modules: BTreeMap<String, PathBuf>,
    /// Directories scanned for classes to clone, in lookup order.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Directories searched for configuration sources such as `generator`.
    #[serde(default)]
    pub config_dirs: Vec<PathBuf>,
    /// Extra templates overriding or adding to the built-in ones.
    #[serde(default)]
    pub templates: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Configuration source read for `defaults.<kind>`.
    pub defaults_source: String,
    /// Require module directories to exist.
    pub verify_modules: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                app_root: PathBuf::from("application"),
                modules_root: PathBuf::from("modules"),
                modules: BTreeMap::new(),
                sources: vec![
                    PathBuf::from("application/classes"),
                    PathBuf::from("modules"),
                    PathBuf::from("system/classes"),
                ],
                config_dirs: vec![PathBuf::from("application/config")],
                templates: None,
            },
            generator: GeneratorConfig {
                defaults_source: "generator".into(),
                verify_modules: true,
            },
            output: OutputConfig { no_color: false },
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the platform default is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path.as_path()).required(true)),
            None => builder.add_source(config::File::from(Self::config_path()).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix("STENCIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs`, falling back to `.stencil.toml` in
    /// the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stencil.toml"))
    }

    /// The file actually read, if any.
    pub fn active_path(config_file: Option<&Path>) -> Option<PathBuf> {
        match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => Some(Self::config_path()).filter(|p| p.is_file()),
        }
    }

    /// The configuration as a JSON value, for key lookups and listing.
    pub fn to_value(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
