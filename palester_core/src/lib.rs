#![forbid(unsafe_code)]

//! Core domain model and business logic for the Palester workout tracker.
//!
//! This crate provides:
//! - Domain types (lifts, sessions, programs, workouts)
//! - Single-document SQLite storage with legacy decoding
//! - Calendar classification
//! - Program drafts and workout logging rules
//! - Gym proximity checks
//! - Backup export and import

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod legacy;
pub mod store;
pub mod program;
pub mod workout;
pub mod calendar;
pub mod proximity;
pub mod backup;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::DataStore;
pub use program::{active_program, ProgramDraft, SessionDraft};
pub use calendar::{classify_month, CalendarCell, DayCategory, MonthCursor, TodayStyle};
pub use proximity::{distance_m, is_at_gym};
