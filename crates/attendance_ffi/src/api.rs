//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the attendance session to Dart via FRB as sync calls.
//! - Own the process-wide session so platform observers, the tick timer and
//!   the UI all mutate the same state.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call is serialized through one mutex; a poisoned lock is recovered.
//! - Time arguments are `now_epoch_ms` plus `utc_offset_minutes`; a missing
//!   `now_epoch_ms` falls back to the device clock.

use attendance_core::db::open_db;
use attendance_core::model::record::{format_record_date, parse_record_date};
use attendance_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_day_summary,
    ping as ping_inner, timestamp_from_epoch_ms, AttendanceConfig, AttendanceError,
    AttendanceService, Clock, ConditionOutcome, EmployeeIdentity, GeoPoint, InterruptionSource,
    PersistOutcome, SqliteAttendanceStore, SystemClock, TickReport, Timestamp,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const DEFAULT_DB_FILE_NAME: &str = "attendance.sqlite3";
const SIGN_OFF_FAILED_PREFIX: &str = "Sign-off failed";

type Service = AttendanceService<SqliteAttendanceStore>;

static ACTIVE_SESSION: OnceLock<Mutex<Option<Service>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation did what was asked.
    pub ok: bool,
    /// Human-readable message for snackbars and diagnostics.
    pub message: String,
    /// Pause/resume notice to show the user, if the call changed phase.
    pub notice: Option<String>,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            notice: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            notice: None,
        }
    }

    fn from_condition(outcome: ConditionOutcome) -> Self {
        Self {
            ok: true,
            message: condition_label(outcome).to_string(),
            notice: outcome.notice().map(str::to_string),
        }
    }
}

/// Attendance card state returned by every tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttendanceView {
    pub ok: bool,
    pub message: String,
    /// `YYYY-MM-DD` of the session.
    pub date: String,
    /// `Active|Present|Absent|--`.
    pub status_text: String,
    pub working_hours: String,
    pub attendance_marked: bool,
    /// `not_marked|active|paused`.
    pub tracking_state: String,
    pub check_in_time: String,
    /// `In Office|Not in Office`.
    pub zone_status: String,
    pub within_office_hours: bool,
    pub signed_off: bool,
    pub rolled_over: bool,
    /// `not_marked|not_due|offline|written|stale|failed`.
    pub persistence: String,
    /// Repeated write failures crossed the notice threshold.
    pub notify_user: bool,
}

/// One row of the admin recent-attendance list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentAttendanceItem {
    pub display_name: String,
    pub time: String,
    /// `Present|Absent`.
    pub status: String,
}

/// Admin day summary envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySummaryView {
    pub ok: bool,
    pub message: String,
    pub total_employees: u32,
    pub present: u32,
    pub absent: u32,
    pub recent: Vec<RecentAttendanceItem>,
}

/// Starts (or replaces) the process-wide attendance session.
///
/// Input semantics:
/// - `config_json`: attendance config document; empty uses defaults.
/// - `db_path`: SQLite file for the local mirror; empty uses the temp dir.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_start(
    config_json: String,
    employee_id: String,
    email: String,
    db_path: String,
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
) -> ActionResponse {
    match start_service(
        &config_json,
        &employee_id,
        &email,
        &db_path,
        now_epoch_ms,
        utc_offset_minutes,
    ) {
        Ok(service) => {
            let replaced = lock_session().replace(service).is_some();
            info!("event=attendance_start module=ffi status=ok replaced={replaced}");
            ActionResponse::success("Attendance session started.")
        }
        Err(err) => {
            warn!("event=attendance_start module=ffi status=error");
            ActionResponse::failure(format!("attendance_start failed: {err}"))
        }
    }
}

/// Drops the process-wide session, e.g. on logout.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_stop() -> ActionResponse {
    match lock_session().take() {
        Some(_) => ActionResponse::success("Attendance session stopped."),
        None => ActionResponse::success("No attendance session was running."),
    }
}

/// Attempts check-in.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_mark(now_epoch_ms: Option<i64>, utc_offset_minutes: i32) -> ActionResponse {
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        let result = service.mark_attendance(now);
        ActionResponse {
            ok: result.is_marked(),
            message: result.message().to_string(),
            notice: None,
        }
    })
    .unwrap_or_else(|err| ActionResponse::failure(format!("attendance_mark failed: {err}")))
}

/// Reports a connectivity, location-services or geofence change.
///
/// `source` accepts `connectivity|internet`, `location|location_services`,
/// `geofence|zone`.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_set_condition(
    source: String,
    blocking: bool,
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
) -> ActionResponse {
    let Some(source) = InterruptionSource::parse(&source) else {
        return ActionResponse::failure(format!(
            "attendance_set_condition failed: unknown source `{source}`"
        ));
    };
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        ActionResponse::from_condition(service.set_condition(source, blocking, now))
    })
    .unwrap_or_else(|err| {
        ActionResponse::failure(format!("attendance_set_condition failed: {err}"))
    })
}

/// Reports a location fix; both coordinates `None` means no fix.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_update_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
) -> ActionResponse {
    let fix = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
        _ => None,
    };
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        ActionResponse::from_condition(service.update_location(fix, now))
    })
    .unwrap_or_else(|err| {
        ActionResponse::failure(format!("attendance_update_location failed: {err}"))
    })
}

/// Runs the periodic tick and returns the card state.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_tick(now_epoch_ms: Option<i64>, utc_offset_minutes: i32) -> AttendanceView {
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        to_attendance_view(service.tick(now))
    })
    .unwrap_or_else(|err| AttendanceView {
        ok: false,
        message: format!("attendance_tick failed: {err}"),
        ..AttendanceView::default()
    })
}

/// Background-service write of the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_background_sync(
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
) -> ActionResponse {
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        match service.background_sync(now) {
            Ok(true) => ActionResponse::success("Attendance synced."),
            Ok(false) => ActionResponse::success("Nothing to sync."),
            Err(err @ AttendanceError::StaleWrite { .. }) => ActionResponse {
                ok: true,
                message: err.to_string(),
                notice: None,
            },
            Err(err) => {
                ActionResponse::failure(format!("attendance_background_sync failed: {err}"))
            }
        }
    })
    .unwrap_or_else(|err| {
        ActionResponse::failure(format!("attendance_background_sync failed: {err}"))
    })
}

/// Archives the day and resets the session.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_sign_off(now_epoch_ms: Option<i64>, utc_offset_minutes: i32) -> ActionResponse {
    with_service_at(now_epoch_ms, utc_offset_minutes, |service, now| {
        match service.sign_off(now) {
            Ok(_) => ActionResponse::success(
                attendance_core::service::attendance_service::SIGN_OFF_SUCCESS_MESSAGE,
            ),
            Err(err) => ActionResponse::failure(format!("{SIGN_OFF_FAILED_PREFIX}: {err}")),
        }
    })
    .unwrap_or_else(|err| ActionResponse::failure(format!("{SIGN_OFF_FAILED_PREFIX}: {err}")))
}

/// Summarizes `date` (`YYYY-MM-DD`) from the local mirror at `db_path`.
///
/// Independent of the running session; admin views call it directly.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_day_summary(
    db_path: String,
    date: String,
    total_employees: u32,
) -> DaySummaryView {
    let Some(date) = parse_record_date(&date) else {
        return DaySummaryView {
            message: format!("attendance_day_summary failed: invalid date `{date}`"),
            ..DaySummaryView::default()
        };
    };

    let summary = open_db(resolve_db_path(&db_path))
        .map_err(|err| err.to_string())
        .and_then(|conn| SqliteAttendanceStore::try_new(conn).map_err(|err| err.to_string()))
        .and_then(|store| {
            load_day_summary(&store, date, total_employees).map_err(|err| err.to_string())
        });

    match summary {
        Ok(summary) => DaySummaryView {
            ok: true,
            message: format!("{} present, {} absent.", summary.present, summary.absent),
            total_employees: summary.total_employees,
            present: summary.present,
            absent: summary.absent,
            recent: summary
                .recent
                .into_iter()
                .map(|entry| RecentAttendanceItem {
                    display_name: entry.display_name,
                    time: entry.time,
                    status: entry.status.as_str().to_string(),
                })
                .collect(),
        },
        Err(err) => DaySummaryView {
            message: format!("attendance_day_summary failed: {err}"),
            ..DaySummaryView::default()
        },
    }
}

fn start_service(
    config_json: &str,
    employee_id: &str,
    email: &str,
    db_path: &str,
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
) -> Result<Service, String> {
    let config = if config_json.trim().is_empty() {
        AttendanceConfig::default()
    } else {
        AttendanceConfig::from_json_str(config_json).map_err(|err| err.to_string())?
    };
    if employee_id.trim().is_empty() {
        return Err("employee_id cannot be empty".to_string());
    }
    let now = resolve_now(now_epoch_ms, utc_offset_minutes)?;

    let conn = open_db(resolve_db_path(db_path)).map_err(|err| format!("DB open failed: {err}"))?;
    let store =
        SqliteAttendanceStore::try_new(conn).map_err(|err| format!("store init failed: {err}"))?;
    let identity = EmployeeIdentity::from_email(employee_id.trim(), email);
    AttendanceService::new(&config, identity, store, now.date_naive())
        .map_err(|err| err.to_string())
}

fn lock_session() -> std::sync::MutexGuard<'static, Option<Service>> {
    ACTIVE_SESSION
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| {
            warn!("event=session_lock module=ffi status=poison_recovered");
            poisoned.into_inner()
        })
}

fn with_service_at<T>(
    now_epoch_ms: Option<i64>,
    utc_offset_minutes: i32,
    f: impl FnOnce(&mut Service, Timestamp) -> T,
) -> Result<T, String> {
    let now = resolve_now(now_epoch_ms, utc_offset_minutes)?;
    let mut guard = lock_session();
    let service = guard
        .as_mut()
        .ok_or_else(|| "attendance session not started".to_string())?;
    Ok(f(service, now))
}

fn resolve_now(now_epoch_ms: Option<i64>, utc_offset_minutes: i32) -> Result<Timestamp, String> {
    match now_epoch_ms {
        Some(epoch_ms) => timestamp_from_epoch_ms(epoch_ms, utc_offset_minutes).ok_or_else(|| {
            format!("invalid time: epoch_ms={epoch_ms} utc_offset_minutes={utc_offset_minutes}")
        }),
        None => Ok(SystemClock.now()),
    }
}

fn resolve_db_path(db_path: &str) -> PathBuf {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
    } else {
        PathBuf::from(trimmed)
    }
}

fn to_attendance_view(report: TickReport) -> AttendanceView {
    let view = report.view;
    let (persistence, notify_user) = match &report.persistence {
        PersistOutcome::NotMarked => ("not_marked", false),
        PersistOutcome::NotDue => ("not_due", false),
        PersistOutcome::Offline => ("offline", false),
        PersistOutcome::Written => ("written", false),
        PersistOutcome::Stale { .. } => ("stale", false),
        PersistOutcome::Failed { notify_user, .. } => ("failed", *notify_user),
    };
    let message = match report.persistence {
        PersistOutcome::Failed { message, .. } => message,
        _ => String::new(),
    };
    AttendanceView {
        ok: true,
        message,
        date: format_record_date(view.date),
        status_text: view.status_text.as_str().to_string(),
        working_hours: view.working_hours,
        attendance_marked: view.attendance_marked,
        tracking_state: view.tracking_state.as_str().to_string(),
        check_in_time: view.check_in_time,
        zone_status: view.zone_status.as_str().to_string(),
        within_office_hours: view.within_office_hours,
        signed_off: view.signed_off,
        rolled_over: report.rolled_over,
        persistence: persistence.to_string(),
        notify_user,
    }
}

fn condition_label(outcome: ConditionOutcome) -> &'static str {
    match outcome {
        ConditionOutcome::Unchanged => "unchanged",
        ConditionOutcome::Recorded => "recorded",
        ConditionOutcome::Paused => "paused",
        ConditionOutcome::Resumed => "resumed",
    }
}
