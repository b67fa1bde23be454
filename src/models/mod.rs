// Domain entities stored in the ledger

pub mod task;
pub mod event;
pub mod project;

pub use task::*;
pub use event::*;
pub use project::*;
