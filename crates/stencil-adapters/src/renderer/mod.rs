//! Template renderer adapters.

mod engine;

pub use engine::{BUILTIN_TEMPLATES, HandlebarsRenderer};
