//! Sitecal (Site Calendar) - construction project tasks and events with
//! recurring schedules
//!
//! This library provides the core functionality for Sitecal, including:
//! - The recurrence rule engine (validation, stepping, window expansion,
//!   next-due computation, descriptions)
//! - Database operations and migrations
//! - Data models for projects, tasks and events
//! - Repository layer for data access, including recurring task completion
//! - The calendar view and CLI command handling
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use sitecal::models::Event;
//! use sitecal::recurrence::{expand, Pattern, RecurrenceRule};
//!
//! let start = DateTime::parse_from_rfc3339("2024-01-01T07:00:00+10:00").unwrap();
//! let end = DateTime::parse_from_rfc3339("2024-01-01T08:00:00+10:00").unwrap();
//! let meeting = Event::new("Site meeting".to_string(), start, end).unwrap();
//! let rule = RecurrenceRule::new(Pattern::weekly_on(&[1]));
//!
//! let window_end = DateTime::parse_from_rfc3339("2024-01-31T23:59:59+10:00").unwrap();
//! let occurrences = expand(&meeting, &rule, start, window_end);
//! assert_eq!(occurrences.len(), 5);
//! ```

pub mod error;
pub mod config;
pub mod recurrence;
pub mod db;
pub mod models;
pub mod repo;
pub mod calendar;
pub mod cli;
pub mod utils;
