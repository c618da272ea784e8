//! CLI argument definitions using the clap derive API.
//!
//! Argument names, aliases and help text live here. No generation logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate, clone and remove class files",
    long_about = "Stencil generates class, controller and test files from \
                  templates, and can re-emit existing classes under a new name.",
    after_help = "EXAMPLES:\n\
        \x20 stencil class Model_Post --extend ORM --module blog\n\
        \x20 stencil class Cache_Memory --clone Kohana_Cache --reflect --inherit\n\
        \x20 stencil controller Blog index,show --pretend\n\
        \x20 stencil module blog\n\
        \x20 stencil class Model_Post --module blog --remove --yes",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a class, optionally with a stub and a unit test.
    #[command(
        visible_alias = "c",
        about = "Generate a class",
        after_help = "EXAMPLES:\n\
            \x20 stencil class Log_Reader --implement Countable,Iterator --abstract\n\
            \x20 stencil class Kohana_Log_Reader --stub Log_Reader --extend Kohana_Log\n\
            \x20 stencil class Cache_Memory --clone Kohana_Cache --no-test"
    )]
    Class(ClassArgs),

    /// Generate a controller with action methods.
    #[command(
        visible_alias = "ctl",
        about = "Generate a controller",
        after_help = "EXAMPLES:\n\
            \x20 stencil controller Welcome\n\
            \x20 stencil controller Admin_Users index,edit --extend Controller_Admin"
    )]
    Controller(ControllerArgs),

    /// Generate the skeleton of a new module.
    #[command(
        visible_alias = "mod",
        about = "Generate a module skeleton",
        after_help = "EXAMPLES:\n\
            \x20 stencil module blog\n\
            \x20 stencil module blog --path vendor/modules --pretend"
    )]
    Module(ModuleArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Stencil configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil config get paths.modules_root\n\
            \x20 stencil config list\n\
            \x20 stencil config path"
    )]
    Config(ConfigCommands),
}

// ── shared generation options ─────────────────────────────────────────────────

/// Options shared by every generating subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    /// Generate into this module instead of the application.
    #[arg(short = 'm', long = "module", value_name = "MODULE")]
    pub module: Option<String>,

    /// Template id to render the main file with.
    #[arg(short = 't', long = "template", value_name = "ID")]
    pub template: Option<String>,

    /// Show what would be done without touching any file.
    #[arg(short = 'p', long = "pretend", visible_alias = "dry-run")]
    pub pretend: bool,

    /// Overwrite existing files.
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Remove the files instead of creating them.
    #[arg(long = "remove")]
    pub remove: bool,

    /// Do not check that the module directory exists.
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Base directory for modules, or for the files when no module is given.
    #[arg(long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Configuration source holding generator defaults.
    #[arg(long = "defaults", value_name = "SOURCE")]
    pub defaults: Option<String>,

    /// Skip the confirmation prompt before removing files.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

// ── class ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClassArgs {
    /// Class name, e.g. `Model_Post`.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Parent class.
    #[arg(short = 'e', long = "extend", value_name = "CLASS")]
    pub extend: Option<String>,

    /// Comma-separated interfaces to implement.
    #[arg(short = 'i', long = "implement", value_name = "LIST")]
    pub implement: Option<String>,

    /// Declare the class abstract.
    #[arg(long = "abstract")]
    pub is_abstract: bool,

    /// Also generate a blank class extending NAME.
    #[arg(long = "stub", value_name = "CLASS")]
    pub stub: Option<String>,

    /// Skip the unit test.
    #[arg(long = "no-test")]
    pub no_test: bool,

    /// Copy an existing class under the new name.
    #[arg(long = "clone", value_name = "CLASS", conflicts_with_all = ["extend", "implement", "is_abstract"])]
    pub clone: Option<String>,

    /// Rebuild the clone from the analyzed class instead of copying its file.
    #[arg(long = "reflect", requires = "clone")]
    pub reflect: bool,

    /// Include inherited members in a reflected clone.
    #[arg(long = "inherit", requires = "reflect")]
    pub inherit: bool,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

// ── controller ────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ControllerArgs {
    /// Controller name without the `Controller_` prefix, e.g. `Blog`.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Comma-separated action names (default: index).
    #[arg(value_name = "ACTIONS")]
    pub actions: Option<String>,

    /// Parent controller.
    #[arg(short = 'e', long = "extend", value_name = "CLASS")]
    pub extend: Option<String>,

    /// Generate no action methods.
    #[arg(long = "blank", conflicts_with = "actions")]
    pub blank: bool,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

// ── module ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Module name, e.g. `blog`.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Show what would be done without touching any file.
    #[arg(short = 'p', long = "pretend", visible_alias = "dry-run")]
    pub pretend: bool,

    /// Overwrite existing files.
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Remove the module files instead of creating them.
    #[arg(long = "remove")]
    pub remove: bool,

    /// Directory the module is created in (default: the modules root).
    #[arg(long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Configuration source holding generator defaults.
    #[arg(long = "defaults", value_name = "SOURCE")]
    pub defaults: Option<String>,

    /// Skip the confirmation prompt before removing files.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl From<&ModuleArgs> for GenerateArgs {
    /// The module does not exist yet, so its directory is never verified.
    fn from(args: &ModuleArgs) -> Self {
        Self {
            module: Some(args.name.clone()),
            template: None,
            pretend: args.pretend,
            force: args.force,
            remove: args.remove,
            no_verify: true,
            path: args.path.clone(),
            defaults: args.defaults.clone(),
            yes: args.yes,
        }
    }
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `paths.app_root`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path of the configuration file in use.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
