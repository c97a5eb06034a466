//! Pure policies evaluated against session inputs.
//!
//! # Responsibility
//! - Decide geofence membership, office-hours membership and status labels.
//! - Stay free of I/O and session mutation so views can be recomputed per tick.

pub mod geofence;
pub mod office_hours;
pub mod status;
