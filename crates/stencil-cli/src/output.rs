//! Terminal output for the generating commands.
//!
//! Everything meant for the user goes to stdout through [`OutputManager`];
//! errors and logs go to stderr elsewhere.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;

use stencil_adapters::ModuleMap;
use stencil_core::prelude::{Command, LogEntry};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Width of the right-aligned action label.
const LABEL_WIDTH: usize = 8;

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    /// Colors are used only on a terminal and when neither the flag nor the
    /// configuration disables them.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let color = !args.no_color && !config.output.no_color && io::stdout().is_terminal();
        Self {
            format: args.format,
            quiet: args.quiet,
            color,
            term: Term::stdout(),
        }
    }

    /// A line of plain text. Suppressed by `--quiet`.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// A note about the run. Kept out of JSON output.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet || self.format == OutputFormat::Json {
            return Ok(());
        }
        if self.color {
            self.term.write_line(&msg.blue().to_string())
        } else {
            self.term.write_line(msg)
        }
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet || self.format == OutputFormat::Json {
            return Ok(());
        }
        if self.color {
            self.term.write_line(&text.cyan().bold().to_string())
        } else {
            self.term.write_line(text)
        }
    }

    /// `  create  APPPATH/classes/Foo.php`
    pub fn action(&self, status: Command, item: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&self.action_line(status, item))
    }

    fn action_line(&self, status: Command, item: &str) -> String {
        let label = format!("{:>width$}", status.to_string(), width = LABEL_WIDTH);
        if !self.color {
            return format!("{label}  {item}");
        }
        match status {
            Command::Create => format!("{}  {item}", label.green().bold()),
            Command::Remove => format!("{}  {item}", label.red().bold()),
        }
    }

    /// Report a builder log, shortening paths with the symbolic roots.
    ///
    /// JSON output prints the entries as an array even in quiet mode.
    pub fn log(&self, entries: &[LogEntry], paths: &ModuleMap) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
                self.term.write_line(&json)
            }
            OutputFormat::Text => {
                for entry in entries {
                    self.action(entry.status, &paths.display(&entry.item))?;
                }
                Ok(())
            }
        }
    }
}
