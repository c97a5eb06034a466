//! Attendance session state machine.
//!
//! # Responsibility
//! - Own one employee-day of attendance state: check-in, accrued working
//!   time, and pause bookkeeping per interruption source.
//! - Decide at every event whether the working-time clock runs.
//!
//! # Invariants
//! - Tracking is active iff attendance is marked and no interruption source
//!   is blocking. Office hours gate marking only, never a running session.
//! - Closed working time (`accumulated`) only grows; negative spans caused by
//!   clock skew are clamped to zero.
//! - An open segment exists iff tracking is active.
//! - The session never performs I/O; callers serialize all mutations.

use crate::clock::Timestamp;
use crate::model::record::AttendanceMark;
use crate::model::working_hours::format_working_hours;
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notice emitted when tracking pauses.
pub const NOTICE_TRACKING_PAUSED: &str = "Tracking paused. Working hours stopped.";
/// Notice emitted when tracking resumes.
pub const NOTICE_TRACKING_RESUMED: &str = "Tracking resumed. Working hours updated.";

/// Condition that can pause the working-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionSource {
    /// Internet reachability.
    Connectivity,
    /// Device location provider enabled.
    Location,
    /// Membership in the office geofence.
    Geofence,
}

impl InterruptionSource {
    pub const ALL: [InterruptionSource; 3] = [Self::Connectivity, Self::Location, Self::Geofence];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Location => "location",
            Self::Geofence => "geofence",
        }
    }

    /// Parses a source name, accepting the shell's legacy aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "connectivity" | "internet" => Some(Self::Connectivity),
            "location" | "location_services" => Some(Self::Location),
            "geofence" | "zone" => Some(Self::Geofence),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Connectivity => 0,
            Self::Location => 1,
            Self::Geofence => 2,
        }
    }
}

/// Last known condition flags reported by the platform observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    pub has_internet: bool,
    pub has_location_services: bool,
    pub is_in_geofence: bool,
}

impl Default for Conditions {
    /// Online with location enabled, but no fix inside the office yet.
    fn default() -> Self {
        Self {
            has_internet: true,
            has_location_services: true,
            is_in_geofence: false,
        }
    }
}

impl Conditions {
    pub fn all_clear() -> Self {
        Self {
            has_internet: true,
            has_location_services: true,
            is_in_geofence: true,
        }
    }

    pub fn is_blocking(&self, source: InterruptionSource) -> bool {
        match source {
            InterruptionSource::Connectivity => !self.has_internet,
            InterruptionSource::Location => !self.has_location_services,
            InterruptionSource::Geofence => !self.is_in_geofence,
        }
    }

    pub fn any_blocking(&self) -> bool {
        InterruptionSource::ALL
            .iter()
            .any(|source| self.is_blocking(*source))
    }

    fn set_blocking(&mut self, source: InterruptionSource, blocking: bool) {
        match source {
            InterruptionSource::Connectivity => self.has_internet = !blocking,
            InterruptionSource::Location => self.has_location_services = !blocking,
            InterruptionSource::Geofence => self.is_in_geofence = !blocking,
        }
    }
}

/// Externally visible tracking phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    NotMarked,
    Active,
    Paused,
}

impl TrackingState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotMarked => "not_marked",
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

/// Result of a mark-attendance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Check-in recorded; carries the resulting phase.
    Marked(TrackingState),
    /// Already marked for the session date; nothing changed.
    AlreadyMarked,
}

/// Result of a condition-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOutcome {
    /// Same value as already in effect; nothing changed.
    Unchanged,
    /// Condition stored without changing the tracking phase.
    Recorded,
    /// Active segment closed.
    Paused,
    /// New segment opened after the last blocking source cleared.
    Resumed,
}

impl ConditionOutcome {
    /// User-facing notice for phase transitions.
    pub fn notice(self) -> Option<&'static str> {
        match self {
            Self::Paused => Some(NOTICE_TRACKING_PAUSED),
            Self::Resumed => Some(NOTICE_TRACKING_RESUMED),
            Self::Unchanged | Self::Recorded => None,
        }
    }
}

/// Read-only view handed to the persistence writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub date: NaiveDate,
    pub check_in_time: Option<Timestamp>,
    pub working_hours: Duration,
    pub attendance: AttendanceMark,
    pub tracking_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    Active { segment_start: Timestamp },
    Paused { since: Timestamp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarkedDay {
    check_in: Timestamp,
    accumulated: Duration,
    paused_total: Duration,
    tracking: Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    NotMarked,
    Marked(MarkedDay),
}

/// Per-employee, per-day attendance session.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    session_id: Uuid,
    date: NaiveDate,
    conditions: Conditions,
    pause_markers: [Option<Timestamp>; 3],
    state: SessionState,
    display: Duration,
    clock_anomalies: u32,
}

impl AttendanceSession {
    /// Creates an unmarked session with default conditions.
    pub fn new(date: NaiveDate) -> Self {
        Self::with_conditions(date, Conditions::default())
    }

    /// Creates an unmarked session with known condition flags.
    pub fn with_conditions(date: NaiveDate, conditions: Conditions) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            date,
            conditions,
            pause_markers: [None; 3],
            state: SessionState::NotMarked,
            display: Duration::zero(),
            clock_anomalies: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn conditions(&self) -> Conditions {
        self.conditions
    }

    pub fn check_in_time(&self) -> Option<Timestamp> {
        match &self.state {
            SessionState::Marked(day) => Some(day.check_in),
            SessionState::NotMarked => None,
        }
    }

    pub fn is_attendance_marked(&self) -> bool {
        matches!(self.state, SessionState::Marked(_))
    }

    /// Returns whether attendance is marked and the session belongs to `today`.
    pub fn is_attendance_marked_today(&self, today: NaiveDate) -> bool {
        self.is_attendance_marked() && self.date == today
    }

    pub fn is_tracking_active(&self) -> bool {
        self.tracking_state() == TrackingState::Active
    }

    pub fn tracking_state(&self) -> TrackingState {
        match &self.state {
            SessionState::NotMarked => TrackingState::NotMarked,
            SessionState::Marked(day) => match day.tracking {
                Tracking::Active { .. } => TrackingState::Active,
                Tracking::Paused { .. } => TrackingState::Paused,
            },
        }
    }

    /// Start of the open segment, present only while tracking.
    pub fn last_segment_start(&self) -> Option<Timestamp> {
        match &self.state {
            SessionState::Marked(MarkedDay {
                tracking: Tracking::Active { segment_start },
                ..
            }) => Some(*segment_start),
            _ => None,
        }
    }

    /// Working time of all closed segments today.
    pub fn accumulated_duration(&self) -> Duration {
        match &self.state {
            SessionState::Marked(day) => day.accumulated,
            SessionState::NotMarked => Duration::zero(),
        }
    }

    /// Total of closed pause intervals since check-in.
    ///
    /// Overlapping interruptions count once: the interval runs from the first
    /// source blocking to the last source clearing.
    pub fn paused_duration(&self) -> Duration {
        match &self.state {
            SessionState::Marked(day) => day.paused_total,
            SessionState::NotMarked => Duration::zero(),
        }
    }

    /// Timestamp at which `source` most recently started blocking.
    pub fn pause_marker(&self, source: InterruptionSource) -> Option<Timestamp> {
        self.pause_markers[source.index()]
    }

    /// Number of negative spans clamped in this session.
    pub fn clock_anomalies(&self) -> u32 {
        self.clock_anomalies
    }

    /// Working time as of the last `advance` or transition.
    pub fn working_hours(&self) -> Duration {
        self.display
    }

    /// Working time formatted as `<H>h <M>m <S>s`.
    pub fn working_hours_display(&self) -> String {
        format_working_hours(self.display)
    }

    /// Records check-in at `now`.
    ///
    /// Starts a segment when no source is blocking; otherwise the session is
    /// marked but paused, with the pause interval starting at check-in.
    pub fn mark_attendance(&mut self, now: Timestamp) -> MarkOutcome {
        if self.is_attendance_marked() {
            info!(
                "event=attendance_mark module=session status=skipped reason=already_marked session_id={}",
                self.session_id
            );
            return MarkOutcome::AlreadyMarked;
        }

        self.pause_markers = [None; 3];
        for source in InterruptionSource::ALL {
            if self.conditions.is_blocking(source) {
                self.pause_markers[source.index()] = Some(now);
            }
        }

        let tracking = if self.conditions.any_blocking() {
            Tracking::Paused { since: now }
        } else {
            Tracking::Active { segment_start: now }
        };
        self.state = SessionState::Marked(MarkedDay {
            check_in: now,
            accumulated: Duration::zero(),
            paused_total: Duration::zero(),
            tracking,
        });
        self.display = Duration::zero();

        let state = self.tracking_state();
        info!(
            "event=attendance_mark module=session status=ok session_id={} tracking={}",
            self.session_id,
            state.as_str()
        );
        MarkOutcome::Marked(state)
    }

    /// Applies a condition change reported at `now`.
    pub fn set_condition(
        &mut self,
        source: InterruptionSource,
        blocking: bool,
        now: Timestamp,
    ) -> ConditionOutcome {
        if self.conditions.is_blocking(source) == blocking {
            return ConditionOutcome::Unchanged;
        }

        self.conditions.set_blocking(source, blocking);
        self.pause_markers[source.index()] = if blocking { Some(now) } else { None };

        let any_blocking = self.conditions.any_blocking();
        let SessionState::Marked(day) = &mut self.state else {
            return ConditionOutcome::Recorded;
        };

        let tracking = day.tracking;
        let (outcome, anomaly) = match tracking {
            Tracking::Active { segment_start } if blocking => {
                let (span, anomaly) = clamped_span(segment_start, now);
                day.accumulated = day.accumulated + span;
                day.tracking = Tracking::Paused { since: now };
                (ConditionOutcome::Paused, anomaly)
            }
            Tracking::Paused { since } if !any_blocking => {
                let (span, anomaly) = clamped_span(since, now);
                day.paused_total = day.paused_total + span;
                day.tracking = Tracking::Active { segment_start: now };
                (ConditionOutcome::Resumed, anomaly)
            }
            _ => (ConditionOutcome::Recorded, false),
        };
        let accumulated = day.accumulated;

        if anomaly {
            self.note_clock_anomaly("set_condition");
        }
        match outcome {
            ConditionOutcome::Paused => {
                self.display = self.display.max(accumulated);
                info!(
                    "event=tracking_paused module=session status=ok session_id={} source={} accumulated_secs={}",
                    self.session_id,
                    source.as_str(),
                    accumulated.num_seconds()
                );
            }
            ConditionOutcome::Resumed => {
                info!(
                    "event=tracking_resumed module=session status=ok session_id={} source={}",
                    self.session_id,
                    source.as_str()
                );
            }
            ConditionOutcome::Unchanged | ConditionOutcome::Recorded => {}
        }
        outcome
    }

    /// Recomputes the display working time for a tick at `now`.
    ///
    /// Closed working time is not mutated here; it only changes on pause.
    pub fn advance(&mut self, now: Timestamp) -> Duration {
        let computed = match &self.state {
            SessionState::NotMarked => None,
            SessionState::Marked(day) => match day.tracking {
                Tracking::Active { segment_start } => {
                    let (span, anomaly) = clamped_span(segment_start, now);
                    Some((day.accumulated + span, anomaly))
                }
                Tracking::Paused { .. } => Some((day.accumulated, false)),
            },
        };

        match computed {
            Some((value, anomaly)) => {
                if anomaly {
                    self.note_clock_anomaly("advance");
                }
                self.display = self.display.max(value);
            }
            None => self.display = Duration::zero(),
        }
        self.display
    }

    /// Clears the day and returns to the unmarked state for `date`.
    ///
    /// Condition flags are external facts and survive the reset.
    pub fn reset_for_new_day(&mut self, date: NaiveDate) {
        let previous = self.session_id;
        self.session_id = Uuid::new_v4();
        self.date = date;
        self.pause_markers = [None; 3];
        self.state = SessionState::NotMarked;
        self.display = Duration::zero();
        self.clock_anomalies = 0;
        info!(
            "event=session_reset module=session status=ok previous_session_id={} session_id={}",
            previous, self.session_id
        );
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            date: self.date,
            check_in_time: self.check_in_time(),
            working_hours: self.display,
            attendance: if self.is_attendance_marked() {
                AttendanceMark::Present
            } else {
                AttendanceMark::Absent
            },
            tracking_active: self.is_tracking_active(),
        }
    }

    fn note_clock_anomaly(&mut self, operation: &str) {
        self.clock_anomalies = self.clock_anomalies.saturating_add(1);
        warn!(
            "event=clock_anomaly module=session status=clamped session_id={} operation={} count={}",
            self.session_id, operation, self.clock_anomalies
        );
    }
}

/// Returns `end - start`, clamped to zero, and whether clamping happened.
fn clamped_span(start: Timestamp, end: Timestamp) -> (Duration, bool) {
    let span = end.signed_duration_since(start);
    if span < Duration::zero() {
        (Duration::zero(), true)
    } else {
        (span, false)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AttendanceSession, ConditionOutcome, Conditions, InterruptionSource, MarkOutcome,
        TrackingState, NOTICE_TRACKING_PAUSED, NOTICE_TRACKING_RESUMED,
    };
    use crate::clock::Timestamp;
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date")
    }

    fn at(hour: u32, minute: u32, second: u32) -> Timestamp {
        FixedOffset::east_opt(0)
            .expect("utc offset")
            .with_ymd_and_hms(2024, 3, 4, hour, minute, second)
            .single()
            .expect("valid timestamp")
    }

    fn marked_session() -> AttendanceSession {
        let mut session = AttendanceSession::with_conditions(day(), Conditions::all_clear());
        assert_eq!(
            session.mark_attendance(at(9, 0, 0)),
            MarkOutcome::Marked(TrackingState::Active)
        );
        session
    }

    #[test]
    fn new_session_is_not_marked() {
        let session = AttendanceSession::new(day());
        assert_eq!(session.tracking_state(), TrackingState::NotMarked);
        assert!(!session.is_attendance_marked_today(day()));
        assert_eq!(session.working_hours_display(), "0h 0m 0s");
        assert!(session.check_in_time().is_none());
    }

    #[test]
    fn mark_twice_is_benign_noop() {
        let mut session = marked_session();
        session.advance(at(9, 0, 10));
        assert_eq!(
            session.mark_attendance(at(9, 5, 0)),
            MarkOutcome::AlreadyMarked
        );
        assert_eq!(session.check_in_time(), Some(at(9, 0, 0)));
        assert_eq!(session.last_segment_start(), Some(at(9, 0, 0)));
    }

    #[test]
    fn mark_while_blocked_starts_paused_with_markers_at_check_in() {
        let mut session = AttendanceSession::with_conditions(
            day(),
            Conditions {
                has_internet: false,
                has_location_services: true,
                is_in_geofence: true,
            },
        );
        assert_eq!(
            session.mark_attendance(at(9, 0, 0)),
            MarkOutcome::Marked(TrackingState::Paused)
        );
        assert!(session.last_segment_start().is_none());
        assert_eq!(
            session.pause_marker(InterruptionSource::Connectivity),
            Some(at(9, 0, 0))
        );

        assert_eq!(
            session.set_condition(InterruptionSource::Connectivity, false, at(9, 0, 20)),
            ConditionOutcome::Resumed
        );
        session.advance(at(9, 0, 30));
        assert_eq!(session.working_hours_display(), "0h 0m 10s");
        assert_eq!(session.paused_duration(), Duration::seconds(20));
    }

    #[test]
    fn scenario_display_counts_open_segment() {
        let mut session = marked_session();
        session.advance(at(9, 0, 30));
        assert_eq!(session.working_hours_display(), "0h 0m 30s");
        assert_eq!(session.accumulated_duration(), Duration::zero());
    }

    #[test]
    fn scenario_pause_freezes_display() {
        let mut session = marked_session();
        session.advance(at(9, 0, 30));
        let outcome = session.set_condition(InterruptionSource::Connectivity, true, at(9, 0, 30));
        assert_eq!(outcome, ConditionOutcome::Paused);
        assert_eq!(outcome.notice(), Some(NOTICE_TRACKING_PAUSED));

        session.advance(at(9, 1, 0));
        assert_eq!(session.working_hours_display(), "0h 0m 30s");
        assert!(session.last_segment_start().is_none());
        assert_eq!(session.tracking_state(), TrackingState::Paused);
    }

    #[test]
    fn scenario_resume_excludes_paused_interval() {
        let mut session = marked_session();
        session.advance(at(9, 0, 30));
        session.set_condition(InterruptionSource::Connectivity, true, at(9, 0, 30));
        session.advance(at(9, 1, 0));

        let outcome = session.set_condition(InterruptionSource::Connectivity, false, at(9, 2, 0));
        assert_eq!(outcome, ConditionOutcome::Resumed);
        assert_eq!(outcome.notice(), Some(NOTICE_TRACKING_RESUMED));

        session.advance(at(9, 2, 10));
        assert_eq!(session.working_hours_display(), "0h 0m 40s");
        assert_eq!(session.paused_duration(), Duration::seconds(90));
    }

    #[test]
    fn scenario_overlapping_sources_resume_after_last_clears() {
        let mut session = marked_session();

        assert_eq!(
            session.set_condition(InterruptionSource::Connectivity, true, at(9, 0, 10)),
            ConditionOutcome::Paused
        );
        assert_eq!(
            session.set_condition(InterruptionSource::Location, true, at(9, 0, 15)),
            ConditionOutcome::Recorded
        );
        assert_eq!(
            session.set_condition(InterruptionSource::Connectivity, false, at(9, 0, 40)),
            ConditionOutcome::Recorded
        );
        assert_eq!(session.tracking_state(), TrackingState::Paused);
        assert!(session.pause_marker(InterruptionSource::Connectivity).is_none());
        assert_eq!(
            session.pause_marker(InterruptionSource::Location),
            Some(at(9, 0, 15))
        );

        assert_eq!(
            session.set_condition(InterruptionSource::Location, false, at(9, 0, 50)),
            ConditionOutcome::Resumed
        );
        assert_eq!(session.last_segment_start(), Some(at(9, 0, 50)));
        assert_eq!(session.paused_duration(), Duration::seconds(40));
        assert_eq!(session.accumulated_duration(), Duration::seconds(10));

        session.advance(at(9, 1, 0));
        assert_eq!(session.working_hours_display(), "0h 0m 20s");
    }

    #[test]
    fn repeated_condition_value_changes_nothing() {
        let mut session = marked_session();
        session.set_condition(InterruptionSource::Geofence, true, at(9, 0, 10));
        let accumulated = session.accumulated_duration();
        let marker = session.pause_marker(InterruptionSource::Geofence);

        assert_eq!(
            session.set_condition(InterruptionSource::Geofence, true, at(9, 0, 20)),
            ConditionOutcome::Unchanged
        );
        assert_eq!(session.accumulated_duration(), accumulated);
        assert_eq!(session.pause_marker(InterruptionSource::Geofence), marker);
        assert!(session.last_segment_start().is_none());

        session.set_condition(InterruptionSource::Geofence, false, at(9, 0, 30));
        let start = session.last_segment_start();
        assert_eq!(
            session.set_condition(InterruptionSource::Geofence, false, at(9, 0, 40)),
            ConditionOutcome::Unchanged
        );
        assert_eq!(session.last_segment_start(), start);
    }

    #[test]
    fn display_is_monotonic_while_active() {
        let mut session = marked_session();
        let mut previous = session.working_hours();
        for second in 1..=120 {
            let now = at(9, 0, 0) + Duration::seconds(second);
            let current = session.advance(now);
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(session.working_hours_display(), "0h 2m 0s");
    }

    #[test]
    fn pause_conservation_holds_across_interruptions() {
        let mut session = marked_session();
        session.set_condition(InterruptionSource::Geofence, true, at(9, 10, 0));
        session.set_condition(InterruptionSource::Geofence, false, at(9, 25, 0));
        session.set_condition(InterruptionSource::Location, true, at(10, 0, 0));
        session.set_condition(InterruptionSource::Connectivity, true, at(10, 5, 0));
        session.set_condition(InterruptionSource::Location, false, at(10, 7, 0));
        session.set_condition(InterruptionSource::Connectivity, false, at(10, 30, 0));
        session.set_condition(InterruptionSource::Connectivity, true, at(11, 0, 0));

        let elapsed = at(11, 0, 0).signed_duration_since(at(9, 0, 0));
        assert_eq!(
            session.accumulated_duration() + session.paused_duration(),
            elapsed
        );
        assert_eq!(session.paused_duration(), Duration::minutes(45));
    }

    #[test]
    fn reset_clears_day_and_keeps_conditions() {
        let mut session = marked_session();
        session.advance(at(12, 0, 0));
        session.set_condition(InterruptionSource::Connectivity, true, at(12, 0, 0));
        let old_id = session.session_id();

        let next_day = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        session.reset_for_new_day(next_day);

        assert!(!session.is_attendance_marked_today(next_day));
        assert_eq!(session.working_hours_display(), "0h 0m 0s");
        assert_eq!(session.accumulated_duration(), Duration::zero());
        assert!(session.check_in_time().is_none());
        assert!(session.pause_marker(InterruptionSource::Connectivity).is_none());
        assert!(!session.conditions().has_internet);
        assert_ne!(session.session_id(), old_id);
        assert_eq!(session.date(), next_day);
    }

    #[test]
    fn clock_before_check_in_is_clamped() {
        let mut session = marked_session();
        let display = session.advance(at(8, 59, 0));
        assert_eq!(display, Duration::zero());
        assert_eq!(session.clock_anomalies(), 1);

        session.set_condition(InterruptionSource::Connectivity, true, at(8, 58, 0));
        assert_eq!(session.accumulated_duration(), Duration::zero());
        assert_eq!(session.working_hours_display(), "0h 0m 0s");
        assert_eq!(session.clock_anomalies(), 2);
    }

    #[test]
    fn backward_clock_does_not_shrink_display() {
        let mut session = marked_session();
        session.advance(at(9, 10, 0));
        let display = session.advance(at(9, 5, 0));
        assert_eq!(display, Duration::minutes(10));
    }

    #[test]
    fn conditions_before_marking_are_recorded_only() {
        let mut session = AttendanceSession::new(day());
        assert_eq!(
            session.set_condition(InterruptionSource::Geofence, false, at(8, 55, 0)),
            ConditionOutcome::Recorded
        );
        assert!(session.conditions().is_in_geofence);
        assert_eq!(
            session.mark_attendance(at(9, 0, 0)),
            MarkOutcome::Marked(TrackingState::Active)
        );
    }

    #[test]
    fn snapshot_reflects_marked_state() {
        let mut session = marked_session();
        session.advance(at(9, 30, 0));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.check_in_time, Some(at(9, 0, 0)));
        assert_eq!(snapshot.working_hours, Duration::minutes(30));
        assert!(snapshot.tracking_active);
        assert_eq!(snapshot.attendance, crate::model::record::AttendanceMark::Present);
    }

    #[test]
    fn source_parse_accepts_aliases() {
        assert_eq!(
            InterruptionSource::parse("Internet"),
            Some(InterruptionSource::Connectivity)
        );
        assert_eq!(
            InterruptionSource::parse("location_services"),
            Some(InterruptionSource::Location)
        );
        assert_eq!(InterruptionSource::parse("zone"), Some(InterruptionSource::Geofence));
        assert_eq!(InterruptionSource::parse("bluetooth"), None);
    }
}
