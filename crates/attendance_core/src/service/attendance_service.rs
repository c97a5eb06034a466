//! Attendance use-case service.
//!
//! # Responsibility
//! - Gate marking on connectivity, location, office hours and geofence.
//! - Drive the session from platform events and the periodic tick.
//! - Hand snapshots to the persistence writer and report its outcome.
//!
//! # Invariants
//! - The session is mutated only through this service's `&mut self` methods.
//! - Persistence failures never roll back or pause the session.
//! - A signed-off day cannot be marked again until the local date changes.

use crate::clock::Timestamp;
use crate::config::{AttendanceConfig, ConfigResult};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::record::{
    format_check_in, AttendanceRecord, DailyRecord, EmployeeIdentity, UpdateSource, ZoneStatus,
};
use crate::model::session::{
    AttendanceSession, ConditionOutcome, InterruptionSource, MarkOutcome, SessionSnapshot,
    TrackingState,
};
use crate::policy::geofence::{GeoPoint, Geofence};
use crate::policy::office_hours::OfficeHours;
use crate::policy::status::{derive_status_text, derive_zone_status, StatusInputs, StatusText};
use crate::repo::record_repo::AttendanceStore;
use crate::service::writer::PersistenceWriter;
use chrono::{Duration, NaiveDate, TimeZone};
use log::{debug, info, warn};

pub const SIGN_OFF_SUCCESS_MESSAGE: &str = "Signed off successfully! Data saved.";

/// Reason a mark request was refused, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkRejection {
    SignedOff,
    NoInternet,
    LocationDisabled,
    OutsideOfficeHours,
    OutsideOfficeZone,
}

impl MarkRejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::SignedOff => "Already signed off for today",
            Self::NoInternet => "No internet connection",
            Self::LocationDisabled => "Location services disabled",
            Self::OutsideOfficeHours => "Outside office hours",
            Self::OutsideOfficeZone => "Not in office zone",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedOff => "signed_off",
            Self::NoInternet => "no_internet",
            Self::LocationDisabled => "location_disabled",
            Self::OutsideOfficeHours => "outside_office_hours",
            Self::OutsideOfficeZone => "outside_office_zone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    Marked(TrackingState),
    AlreadyMarked,
    Rejected(MarkRejection),
}

impl MarkResult {
    pub fn is_marked(self) -> bool {
        matches!(self, Self::Marked(_))
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Marked(_) => "Attendance Marked",
            Self::AlreadyMarked => "Attendance already marked today",
            Self::Rejected(reason) => reason.message(),
        }
    }
}

/// What the periodic write did on this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing to mirror before check-in or after sign-off.
    NotMarked,
    /// Interval since the last successful write has not elapsed.
    NotDue,
    /// No internet; the write waits for connectivity.
    Offline,
    Written,
    /// A fresher record was already stored.
    Stale { stored_last_updated: i64 },
    Failed { message: String, notify_user: bool },
}

/// Read model for the attendance card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub date: NaiveDate,
    pub status_text: StatusText,
    pub working_hours: String,
    pub attendance_marked: bool,
    pub tracking_state: TrackingState,
    pub check_in_time: String,
    pub zone_status: ZoneStatus,
    pub within_office_hours: bool,
    pub signed_off: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub view: SessionView,
    /// The local date changed and the session was reset before this tick.
    pub rolled_over: bool,
    pub persistence: PersistOutcome,
}

/// Owns one employee's session and its persistence path.
pub struct AttendanceService<S: AttendanceStore> {
    identity: EmployeeIdentity,
    geofence: Geofence,
    office_hours: OfficeHours,
    persist_interval: Duration,
    session: AttendanceSession,
    writer: PersistenceWriter<S>,
    last_persisted_at: Option<Timestamp>,
    signed_off_on: Option<NaiveDate>,
}

impl<S: AttendanceStore> AttendanceService<S> {
    /// Builds a service with an unmarked session for `today`.
    ///
    /// # Errors
    /// - Returns `ConfigError` when `config` fails validation.
    pub fn new(
        config: &AttendanceConfig,
        identity: EmployeeIdentity,
        store: S,
        today: NaiveDate,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            identity,
            geofence: config.geofence(),
            office_hours: config.office_hours_window()?,
            persist_interval: config.persist_interval(),
            session: AttendanceSession::new(today),
            writer: PersistenceWriter::new(store, config.failure_notice_threshold),
            last_persisted_at: None,
            signed_off_on: None,
        })
    }

    pub fn identity(&self) -> &EmployeeIdentity {
        &self.identity
    }

    pub fn session(&self) -> &AttendanceSession {
        &self.session
    }

    pub fn writer(&self) -> &PersistenceWriter<S> {
        &self.writer
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn is_signed_off(&self) -> bool {
        self.signed_off_on == Some(self.session.date())
    }

    /// Attempts check-in at `now`.
    pub fn mark_attendance(&mut self, now: Timestamp) -> MarkResult {
        self.roll_over_if_needed(now);

        let result = match self.mark_rejection(now) {
            Some(reason) => MarkResult::Rejected(reason),
            None => match self.session.mark_attendance(now) {
                MarkOutcome::Marked(state) => {
                    self.last_persisted_at = None;
                    MarkResult::Marked(state)
                }
                MarkOutcome::AlreadyMarked => MarkResult::AlreadyMarked,
            },
        };
        if let MarkResult::Rejected(reason) = result {
            info!(
                "event=attendance_mark module=service status=rejected reason={}",
                reason.as_str()
            );
        }
        result
    }

    /// Forwards a platform condition change to the session.
    pub fn set_condition(
        &mut self,
        source: InterruptionSource,
        blocking: bool,
        now: Timestamp,
    ) -> ConditionOutcome {
        self.roll_over_if_needed(now);
        self.session.set_condition(source, blocking, now)
    }

    /// Evaluates a location fix against the office geofence.
    ///
    /// A missing fix counts as outside the office.
    pub fn update_location(&mut self, fix: Option<GeoPoint>, now: Timestamp) -> ConditionOutcome {
        self.roll_over_if_needed(now);
        let inside = fix.is_some_and(|point| self.geofence.contains(point));
        self.session
            .set_condition(InterruptionSource::Geofence, !inside, now)
    }

    /// Runs one periodic tick: rollover, display refresh, periodic write.
    pub fn tick(&mut self, now: Timestamp) -> TickReport {
        let rolled_over = self.roll_over_if_needed(now);
        self.session.advance(now);
        let persistence = self.persist_if_due(now);
        TickReport {
            view: self.view(now),
            rolled_over,
            persistence,
        }
    }

    /// Writes the current snapshot on behalf of the background service.
    ///
    /// Returns `Ok(false)` without writing while attendance is not marked, so
    /// a signed-off day's record is never overwritten.
    ///
    /// # Errors
    /// - `StaleWrite` when the foreground already stored a fresher record.
    /// - `Persistence` when the store fails.
    pub fn background_sync(&mut self, now: Timestamp) -> AttendanceResult<bool> {
        self.roll_over_if_needed(now);
        if !self.session.is_attendance_marked() {
            debug!("event=background_sync module=service status=skipped reason=not_marked");
            return Ok(false);
        }
        self.session.advance(now);
        let record = self.build_record(UpdateSource::Background, now);
        self.writer.write(&record)?;
        Ok(true)
    }

    /// Archives the day and resets the session.
    ///
    /// Working time is counted up to `now` or the end of the session's day,
    /// whichever comes first. On failure the session is left untouched so
    /// sign-off can be retried.
    ///
    /// # Errors
    /// - `NotMarked` before check-in or after the day was already signed off.
    ///   Stored records are left as they are.
    /// - `Persistence` when the archive or the final live write fails.
    pub fn sign_off(&mut self, now: Timestamp) -> AttendanceResult<DailyRecord> {
        if !self.session.is_attendance_marked() {
            info!(
                "event=sign_off module=service status=skipped reason=not_marked signed_off={}",
                self.is_signed_off()
            );
            return Err(AttendanceError::NotMarked);
        }

        self.session.advance(self.clamp_to_session_day(now));
        let snapshot = self.session.snapshot();
        let daily = DailyRecord::from_snapshot(&self.identity, &snapshot, self.zone_status(), now);
        self.writer.archive(&daily)?;

        let record = self.build_record(UpdateSource::Foreground, now);
        match self.writer.write(&record) {
            Ok(()) => {}
            Err(AttendanceError::StaleWrite {
                stored_last_updated,
                ..
            }) => {
                warn!(
                    "event=sign_off module=service status=stale_final_record \
                     stored_last_updated={stored_last_updated}"
                );
            }
            Err(err) => return Err(err),
        }

        let date = self.session.date();
        self.session.reset_for_new_day(date);
        self.signed_off_on = Some(date);
        self.last_persisted_at = None;
        info!(
            "event=sign_off module=service status=ok date={}",
            daily.date
        );
        Ok(daily)
    }

    /// Builds the card view without advancing the session.
    pub fn view(&self, now: Timestamp) -> SessionView {
        let conditions = self.session.conditions();
        let within_office_hours = self.office_hours.contains(now.time());
        let status_text = derive_status_text(StatusInputs {
            has_internet: conditions.has_internet,
            has_location_services: conditions.has_location_services,
            attendance_marked: self.session.is_attendance_marked(),
            tracking_active: self.session.is_tracking_active(),
            within_office_hours,
        });
        SessionView {
            date: self.session.date(),
            status_text,
            working_hours: self.session.working_hours_display(),
            attendance_marked: self.session.is_attendance_marked(),
            tracking_state: self.session.tracking_state(),
            check_in_time: format_check_in(self.session.check_in_time()),
            zone_status: self.zone_status(),
            within_office_hours,
            signed_off: self.is_signed_off(),
        }
    }

    fn mark_rejection(&self, now: Timestamp) -> Option<MarkRejection> {
        let conditions = self.session.conditions();
        if self.is_signed_off() {
            Some(MarkRejection::SignedOff)
        } else if self.session.is_attendance_marked() {
            None
        } else if !conditions.has_internet {
            Some(MarkRejection::NoInternet)
        } else if !conditions.has_location_services {
            Some(MarkRejection::LocationDisabled)
        } else if !self.office_hours.contains(now.time()) {
            Some(MarkRejection::OutsideOfficeHours)
        } else if !conditions.is_in_geofence {
            Some(MarkRejection::OutsideOfficeZone)
        } else {
            None
        }
    }

    fn zone_status(&self) -> ZoneStatus {
        let conditions = self.session.conditions();
        derive_zone_status(
            conditions.is_in_geofence,
            conditions.has_internet,
            conditions.has_location_services,
        )
    }

    fn build_record(&self, source: UpdateSource, now: Timestamp) -> AttendanceRecord {
        AttendanceRecord::from_snapshot(
            &self.identity,
            &self.session.snapshot(),
            self.zone_status(),
            source,
            now,
        )
    }

    fn roll_over_if_needed(&mut self, now: Timestamp) -> bool {
        let today = now.date_naive();
        let previous = self.session.date();
        if today == previous {
            return false;
        }

        if self.session.is_attendance_marked() && self.session.conditions().has_internet {
            self.session.advance(self.clamp_to_session_day(now));
            let record = self.build_record(UpdateSource::Foreground, now);
            if let Err(err) = self.writer.write(&record) {
                warn!("event=day_rollover module=service status=final_write_failed error={err}");
            }
        }

        self.session.reset_for_new_day(today);
        self.last_persisted_at = None;
        if self.signed_off_on.is_some_and(|date| date != today) {
            self.signed_off_on = None;
        }
        info!("event=day_rollover module=service status=ok");
        true
    }

    /// Caps `now` at the midnight that ends the session's date, in `now`'s offset.
    fn clamp_to_session_day(&self, now: Timestamp) -> Timestamp {
        self.session
            .date()
            .succ_opt()
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
            .map_or(now, |day_end| now.min(day_end))
    }

    fn persist_if_due(&mut self, now: Timestamp) -> PersistOutcome {
        if !self.session.is_attendance_marked() {
            return PersistOutcome::NotMarked;
        }
        if !self.session.conditions().has_internet {
            return PersistOutcome::Offline;
        }
        if let Some(last) = self.last_persisted_at {
            let elapsed = now.signed_duration_since(last);
            if elapsed >= Duration::zero() && elapsed < self.persist_interval {
                return PersistOutcome::NotDue;
            }
        }

        let record = self.build_record(UpdateSource::Foreground, now);
        match self.writer.write(&record) {
            Ok(()) => {
                self.last_persisted_at = Some(now);
                PersistOutcome::Written
            }
            Err(AttendanceError::StaleWrite {
                stored_last_updated,
                ..
            }) => {
                self.last_persisted_at = Some(now);
                PersistOutcome::Stale {
                    stored_last_updated,
                }
            }
            Err(err) => PersistOutcome::Failed {
                message: err.to_string(),
                notify_user: self.writer.needs_user_notice(),
            },
        }
    }
}
