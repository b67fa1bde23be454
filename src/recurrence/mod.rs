//! Recurrence rule engine
//!
//! Tasks and events carry an optional recurrence rule stored as JSON. The
//! engine validates rules, steps through their dates, expands them into
//! occurrences inside a date window for the calendar, and computes the single
//! next due date when a recurring task is completed.
//!
//! Everything here is pure: no database access, no clock reads.

pub mod rule;
pub mod validator;
pub mod advancer;
pub mod occurrence;
pub mod expander;
pub mod next;
pub mod format;

pub use rule::{EndCondition, Pattern, RawRecurrenceRule, RecurrenceRule};
pub use validator::validate;
pub use advancer::{advance, matches};
pub use occurrence::{Anchor, Occurrence};
pub use expander::{expand, expand_stored, expand_with_limit, DEFAULT_MAX_ITERATIONS};
pub use next::{next_due_date, next_due_for_stored, next_task_due};
pub use format::{describe, summary};
