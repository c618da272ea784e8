//! Generation tasks and the registry of task kinds.

mod args;
pub mod kinds;
mod registry;
mod task;

pub use registry::{KindFactory, KindRegistry};
pub use task::{Task, TaskKind};
