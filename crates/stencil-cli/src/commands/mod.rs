//! Subcommand handlers.

pub mod class;
pub mod completions;
pub mod config;
pub mod controller;
mod generate;
pub mod module;
