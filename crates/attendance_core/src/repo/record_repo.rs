//! Attendance store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Mirror live attendance records and sign-off archives keyed by
//!   `(date, employee_id)`.
//! - Resolve concurrent foreground/background writes by freshness marker.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - An upsert whose `last_updated` is older than the stored row is rejected
//!   as stale and leaves the row untouched. Equal timestamps apply, so a retry
//!   of the same record is idempotent.
//! - Read paths reject invalid persisted enum values instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::record::{
    format_record_date, AttendanceMark, AttendanceRecord, DailyRecord, RecordValidationError,
    UpdateSource, ZoneStatus,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    date,
    employee_id,
    name,
    day,
    check_in_time,
    working_hours,
    attendance,
    status,
    tracking_active,
    last_updated,
    update_source,
    session_id
FROM attendance_records";

const DAILY_SELECT_SQL: &str = "SELECT
    date,
    employee_id,
    name,
    day,
    check_in_time,
    working_hours,
    attendance,
    status,
    signed_off_at
FROM daily_records";

const REQUIRED_TABLES: &[&str] = &["attendance_records", "daily_records"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for attendance persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted attendance data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a last-write-wins upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Applied,
    /// A newer row is already stored; carries its freshness marker.
    Stale { stored_last_updated: i64 },
}

/// Persistence contract for attendance documents.
pub trait AttendanceStore {
    fn upsert_attendance(&self, record: &AttendanceRecord) -> RepoResult<UpsertOutcome>;
    fn get_attendance(
        &self,
        date: NaiveDate,
        employee_id: &str,
    ) -> RepoResult<Option<AttendanceRecord>>;
    /// Records for `date`, oldest update first.
    fn list_attendance(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceRecord>>;
    fn save_daily_record(&self, record: &DailyRecord) -> RepoResult<()>;
    fn get_daily_record(
        &self,
        date: NaiveDate,
        employee_id: &str,
    ) -> RepoResult<Option<DailyRecord>>;
}

/// SQLite-backed attendance store owning its connection.
pub struct SqliteAttendanceStore {
    conn: Connection,
}

impl SqliteAttendanceStore {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the schema version is right but a table
    ///   is absent.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(&conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        for table in REQUIRED_TABLES {
            if !table_exists(&conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl AttendanceStore for SqliteAttendanceStore {
    fn upsert_attendance(&self, record: &AttendanceRecord) -> RepoResult<UpsertOutcome> {
        record.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO attendance_records (
                date,
                employee_id,
                name,
                day,
                check_in_time,
                working_hours,
                attendance,
                status,
                tracking_active,
                last_updated,
                update_source,
                session_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT (date, employee_id) DO UPDATE SET
                name = excluded.name,
                day = excluded.day,
                check_in_time = excluded.check_in_time,
                working_hours = excluded.working_hours,
                attendance = excluded.attendance,
                status = excluded.status,
                tracking_active = excluded.tracking_active,
                last_updated = excluded.last_updated,
                update_source = excluded.update_source,
                session_id = excluded.session_id
            WHERE excluded.last_updated >= attendance_records.last_updated;",
            params![
                record.date.as_str(),
                record.employee_id.as_str(),
                record.name.as_str(),
                record.day.as_str(),
                record.check_in_time.as_str(),
                record.working_hours.as_str(),
                record.attendance.as_str(),
                record.status.as_str(),
                bool_to_int(record.tracking_active),
                record.last_updated,
                record.update_source.as_str(),
                record.session_id.to_string(),
            ],
        )?;

        if changed > 0 {
            return Ok(UpsertOutcome::Applied);
        }

        let stored_last_updated: i64 = self.conn.query_row(
            "SELECT last_updated FROM attendance_records WHERE date = ?1 AND employee_id = ?2;",
            params![record.date.as_str(), record.employee_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(UpsertOutcome::Stale {
            stored_last_updated,
        })
    }

    fn get_attendance(
        &self,
        date: NaiveDate,
        employee_id: &str,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL} WHERE date = ?1 AND employee_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![format_record_date(date), employee_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attendance_row(row)?));
        }
        Ok(None)
    }

    fn list_attendance(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL} WHERE date = ?1 ORDER BY last_updated ASC, employee_id ASC;"
        ))?;
        let mut rows = stmt.query([format_record_date(date)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }

    fn save_daily_record(&self, record: &DailyRecord) -> RepoResult<()> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO daily_records (
                date,
                employee_id,
                name,
                day,
                check_in_time,
                working_hours,
                attendance,
                status,
                signed_off_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (date, employee_id) DO UPDATE SET
                name = excluded.name,
                day = excluded.day,
                check_in_time = excluded.check_in_time,
                working_hours = excluded.working_hours,
                attendance = excluded.attendance,
                status = excluded.status,
                signed_off_at = excluded.signed_off_at;",
            params![
                record.date.as_str(),
                record.employee_id.as_str(),
                record.name.as_str(),
                record.day.as_str(),
                record.check_in_time.as_str(),
                record.working_hours.as_str(),
                record.attendance.as_str(),
                record.status.as_str(),
                record.signed_off_at,
            ],
        )?;
        Ok(())
    }

    fn get_daily_record(
        &self,
        date: NaiveDate,
        employee_id: &str,
    ) -> RepoResult<Option<DailyRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{DAILY_SELECT_SQL} WHERE date = ?1 AND employee_id = ?2;"),
                params![format_record_date(date), employee_id],
                |row| Ok(parse_daily_row(row)),
            )
            .optional()?;
        record.transpose()
    }
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let session_text: String = row.get("session_id")?;
    let session_id = Uuid::parse_str(&session_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid `{session_text}` in attendance_records.session_id"
        ))
    })?;

    let update_text: String = row.get("update_source")?;
    let update_source = UpdateSource::parse(&update_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid update source `{update_text}` in attendance_records.update_source"
        ))
    })?;

    let record = AttendanceRecord {
        employee_id: row.get("employee_id")?,
        name: row.get("name")?,
        date: row.get("date")?,
        day: row.get("day")?,
        check_in_time: row.get("check_in_time")?,
        working_hours: row.get("working_hours")?,
        attendance: parse_mark(row, "attendance_records")?,
        status: parse_zone(row, "attendance_records")?,
        tracking_active: int_to_bool(row.get("tracking_active")?, "tracking_active")?,
        last_updated: row.get("last_updated")?,
        update_source,
        session_id,
    };
    record.validate()?;
    Ok(record)
}

fn parse_daily_row(row: &Row<'_>) -> RepoResult<DailyRecord> {
    let record = DailyRecord {
        employee_id: row.get("employee_id")?,
        name: row.get("name")?,
        date: row.get("date")?,
        day: row.get("day")?,
        check_in_time: row.get("check_in_time")?,
        working_hours: row.get("working_hours")?,
        attendance: parse_mark(row, "daily_records")?,
        status: parse_zone(row, "daily_records")?,
        signed_off_at: row.get("signed_off_at")?,
    };
    record.validate()?;
    Ok(record)
}

fn parse_mark(row: &Row<'_>, table: &str) -> RepoResult<AttendanceMark> {
    let value: String = row.get("attendance")?;
    AttendanceMark::parse(&value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid attendance `{value}` in {table}.attendance"))
    })
}

fn parse_zone(row: &Row<'_>, table: &str) -> RepoResult<ZoneStatus> {
    let value: String = row.get("status")?;
    ZoneStatus::parse(&value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in {table}.status"))
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}`"
        ))),
    }
}
