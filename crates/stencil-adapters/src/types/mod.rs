//! Type sources: statically extracted declarations.
//!
//! - [`SourceScanner`] reads `*.php` files from disk.
//! - [`InMemoryTypes`] holds definitions built in code or loaded from JSON.

mod memory;
mod parser;
mod scanner;

pub use memory::InMemoryTypes;
pub use parser::{ParseError, parse_source};
pub use scanner::{SourceScanner, scan_file};
