pub mod project;
pub mod task;
pub mod event;

pub use project::*;
pub use task::*;
pub use event::*;
