//! Persisted attendance documents.
//!
//! # Responsibility
//! - Define the record shape mirrored to the attendance store, keyed by
//!   `(date, employee_id)`.
//! - Build records from session snapshots with the display formats the admin
//!   views read (`YYYY-MM-DD`, weekday name, `hh:mm AM`).
//!
//! # Invariants
//! - `last_updated` is the freshness marker for last-write-wins; it is epoch
//!   millis taken from the same timestamp that produced the snapshot.
//! - `employee_id` is never empty for a persisted record.

use crate::clock::Timestamp;
use crate::model::session::SessionSnapshot;
use crate::model::working_hours::format_working_hours;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Check-in label used before attendance is marked.
pub const CHECK_IN_NOT_MARKED: &str = "Not Marked";

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";
const WEEKDAY_FORMAT: &str = "%A";
const CHECK_IN_FORMAT: &str = "%I:%M %p";

/// Attendance verdict stored for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceMark {
    Present,
    Absent,
}

impl AttendanceMark {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Whether the employee is physically and reachably in the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneStatus {
    #[serde(rename = "In Office")]
    InOffice,
    #[serde(rename = "Not in Office")]
    NotInOffice,
}

impl ZoneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InOffice => "In Office",
            Self::NotInOffice => "Not in Office",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "In Office" => Some(Self::InOffice),
            "Not in Office" => Some(Self::NotInOffice),
            _ => None,
        }
    }
}

/// Which client path produced a record write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Periodic writer driven by the visible app.
    Foreground,
    /// Background service path.
    Background,
}

impl UpdateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "foreground" => Some(Self::Foreground),
            "background" => Some(Self::Background),
            _ => None,
        }
    }
}

/// Employee identity injected by the owning client after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeIdentity {
    pub employee_id: String,
    pub name: String,
}

impl EmployeeIdentity {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
        }
    }

    /// Derives the display name from the local part of an email address.
    ///
    /// Falls back to `Employee` when the email is empty.
    pub fn from_email(employee_id: impl Into<String>, email: &str) -> Self {
        let local_part = email.split('@').next().unwrap_or_default().trim();
        let name = if local_part.is_empty() {
            "Employee"
        } else {
            local_part
        };
        Self::new(employee_id, name)
    }
}

/// Record validation errors raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyEmployeeId,
    InvalidDate(String),
    NegativeTimestamp(i64),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmployeeId => write!(f, "employee_id cannot be empty"),
            Self::InvalidDate(value) => {
                write!(f, "date `{value}` is not a valid YYYY-MM-DD value")
            }
            Self::NegativeTimestamp(value) => write!(f, "timestamp {value} is negative"),
        }
    }
}

impl Error for RecordValidationError {}

/// Live attendance document for one employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Weekday name, e.g. `Monday`.
    pub day: String,
    /// `hh:mm AM` or [`CHECK_IN_NOT_MARKED`].
    pub check_in_time: String,
    pub working_hours: String,
    pub attendance: AttendanceMark,
    pub status: ZoneStatus,
    pub tracking_active: bool,
    /// Epoch millis; freshness marker for last-write-wins.
    pub last_updated: i64,
    pub update_source: UpdateSource,
    pub session_id: Uuid,
}

impl AttendanceRecord {
    /// Builds the record mirrored to the store for `snapshot` at `now`.
    pub fn from_snapshot(
        identity: &EmployeeIdentity,
        snapshot: &SessionSnapshot,
        status: ZoneStatus,
        source: UpdateSource,
        now: Timestamp,
    ) -> Self {
        Self {
            employee_id: identity.employee_id.clone(),
            name: identity.name.clone(),
            date: format_record_date(snapshot.date),
            day: snapshot.date.format(WEEKDAY_FORMAT).to_string(),
            check_in_time: format_check_in(snapshot.check_in_time),
            working_hours: format_working_hours(snapshot.working_hours),
            attendance: snapshot.attendance,
            status,
            tracking_active: snapshot.tracking_active,
            last_updated: now.timestamp_millis(),
            update_source: source,
            session_id: snapshot.session_id,
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_key(&self.employee_id, &self.date)?;
        if self.last_updated < 0 {
            return Err(RecordValidationError::NegativeTimestamp(self.last_updated));
        }
        Ok(())
    }
}

/// Sign-off archive entry for one employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub employee_id: String,
    pub name: String,
    pub date: String,
    pub day: String,
    pub check_in_time: String,
    pub working_hours: String,
    pub attendance: AttendanceMark,
    pub status: ZoneStatus,
    pub signed_off_at: i64,
}

impl DailyRecord {
    pub fn from_snapshot(
        identity: &EmployeeIdentity,
        snapshot: &SessionSnapshot,
        status: ZoneStatus,
        signed_off_at: Timestamp,
    ) -> Self {
        Self {
            employee_id: identity.employee_id.clone(),
            name: identity.name.clone(),
            date: format_record_date(snapshot.date),
            day: snapshot.date.format(WEEKDAY_FORMAT).to_string(),
            check_in_time: format_check_in(snapshot.check_in_time),
            working_hours: format_working_hours(snapshot.working_hours),
            attendance: snapshot.attendance,
            status,
            signed_off_at: signed_off_at.timestamp_millis(),
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_key(&self.employee_id, &self.date)?;
        if self.signed_off_at < 0 {
            return Err(RecordValidationError::NegativeTimestamp(self.signed_off_at));
        }
        Ok(())
    }
}

/// Formats a calendar date as the record key segment (`YYYY-MM-DD`).
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

/// Parses a record key date (`YYYY-MM-DD`).
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), RECORD_DATE_FORMAT).ok()
}

/// Formats a check-in timestamp as `hh:mm AM`.
pub fn format_check_in(check_in: Option<Timestamp>) -> String {
    match check_in {
        Some(value) => value.format(CHECK_IN_FORMAT).to_string(),
        None => CHECK_IN_NOT_MARKED.to_string(),
    }
}

fn validate_key(employee_id: &str, date: &str) -> Result<(), RecordValidationError> {
    if employee_id.trim().is_empty() {
        return Err(RecordValidationError::EmptyEmployeeId);
    }
    if parse_record_date(date).is_none() {
        return Err(RecordValidationError::InvalidDate(date.to_string()));
    }
    Ok(())
}
