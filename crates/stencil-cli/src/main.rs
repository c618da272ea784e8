//! # Stencil CLI
//!
//! Generates, clones and removes class files and module skeletons from
//! templates.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Resource not found      |
//! |  4   | Configuration error     |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // STENCIL_* settings may come from a local .env
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version are "errors" printed to stdout
            let code = if e.use_stderr() { 2 } else { 0 };
            // stdout may be closed; stderr is the last resort
            if e.print().is_err() {
                eprintln!("{e}");
            }
            return ExitCode::from(code);
        }
    };

    let _log_guard = match init_logging(&cli.global) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::from(1);
        }
    };

    let verbose = cli.global.verbose > 0;
    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        config = ?cli.global.config,
        "CLI started"
    );

    match run(cli) {
        Ok(()) => {
            info!("Stencil completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => report(e, verbose),
    }
}

/// Load configuration and dispatch to the command handler.
#[instrument(skip_all)]
fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load(cli.global.config.as_ref())?;
    let output = OutputManager::new(&cli.global, &config);

    match cli.command {
        Commands::Class(cmd) => commands::class::execute(cmd, cli.global, config, output),
        Commands::Controller(cmd) => {
            commands::controller::execute(cmd, cli.global, config, output)
        }
        Commands::Module(cmd) => commands::module::execute(cmd, cli.global, config, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => {
            commands::config::execute(cmd, cli.global.config.as_deref(), config, output)
        }
    }
}

/// Print `err` to stderr and turn it into the process exit code.
fn report(err: CliError, verbose: bool) -> ExitCode {
    err.log();
    eprint!("{}", err.report(verbose, std::io::stderr().is_terminal()));

    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_version_matches_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }
}
