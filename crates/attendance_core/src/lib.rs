//! Core domain logic for employee attendance tracking.
//! This crate is the single source of truth for session invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use clock::{timestamp_from_epoch_ms, Clock, SystemClock, Timestamp};
pub use config::{AttendanceConfig, ConfigError, ConfigResult};
pub use error::{AttendanceError, AttendanceResult};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::record::{
    AttendanceMark, AttendanceRecord, DailyRecord, EmployeeIdentity, UpdateSource, ZoneStatus,
};
pub use model::session::{
    AttendanceSession, ConditionOutcome, Conditions, InterruptionSource, MarkOutcome,
    SessionSnapshot, TrackingState,
};
pub use policy::geofence::{GeoPoint, Geofence};
pub use policy::status::StatusText;
pub use repo::record_repo::{
    AttendanceStore, RepoError, RepoResult, SqliteAttendanceStore, UpsertOutcome,
};
pub use service::attendance_service::{
    AttendanceService, MarkRejection, MarkResult, PersistOutcome, SessionView, TickReport,
};
pub use service::summary::{load_day_summary, summarize_day, DaySummary, RecentAttendance};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
