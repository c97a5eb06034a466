//! Attendance domain model.
//!
//! # Responsibility
//! - Define the session state machine and the documents mirrored from it.
//!
//! # Invariants
//! - One session per employee per day; records are keyed by
//!   `(date, employee_id)`.

pub mod record;
pub mod session;
pub mod working_hours;
