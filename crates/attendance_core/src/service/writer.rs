//! Persistence writer between session snapshots and the attendance store.
//!
//! # Responsibility
//! - Push owned records to the store and classify the result.
//! - Count consecutive failures so the shell can raise a non-blocking notice.
//!
//! # Invariants
//! - The writer never sees the session; it only receives built records.
//! - Stale rejections are not failures: they neither increment nor reset the
//!   failure counter.

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::record::{AttendanceRecord, DailyRecord};
use crate::repo::record_repo::{AttendanceStore, UpsertOutcome};
use log::{debug, error, warn};

pub struct PersistenceWriter<S: AttendanceStore> {
    store: S,
    failure_notice_threshold: u32,
    consecutive_failures: u32,
    last_error: Option<String>,
}

impl<S: AttendanceStore> PersistenceWriter<S> {
    pub fn new(store: S, failure_notice_threshold: u32) -> Self {
        Self {
            store,
            failure_notice_threshold: failure_notice_threshold.max(1),
            consecutive_failures: 0,
            last_error: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes one live record with last-write-wins semantics.
    ///
    /// # Errors
    /// - `StaleWrite` when a fresher record for the same key is stored.
    /// - `Persistence` when the store fails.
    pub fn write(&mut self, record: &AttendanceRecord) -> AttendanceResult<()> {
        match self.store.upsert_attendance(record) {
            Ok(UpsertOutcome::Applied) => {
                self.note_success();
                debug!(
                    "event=attendance_write module=writer status=ok source={} last_updated={}",
                    record.update_source.as_str(),
                    record.last_updated
                );
                Ok(())
            }
            Ok(UpsertOutcome::Stale {
                stored_last_updated,
            }) => {
                warn!(
                    "event=attendance_write module=writer status=stale source={} last_updated={} stored_last_updated={}",
                    record.update_source.as_str(),
                    record.last_updated,
                    stored_last_updated
                );
                Err(AttendanceError::StaleWrite {
                    incoming_last_updated: record.last_updated,
                    stored_last_updated,
                })
            }
            Err(err) => Err(self.note_failure("attendance_write", err.into())),
        }
    }

    /// Archives a sign-off record.
    pub fn archive(&mut self, record: &DailyRecord) -> AttendanceResult<()> {
        match self.store.save_daily_record(record) {
            Ok(()) => {
                self.note_success();
                debug!(
                    "event=daily_archive module=writer status=ok signed_off_at={}",
                    record.signed_off_at
                );
                Ok(())
            }
            Err(err) => Err(self.note_failure("daily_archive", err.into())),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Message of the most recent failure, cleared on the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns whether failures persisted long enough to tell the user.
    pub fn needs_user_notice(&self) -> bool {
        self.consecutive_failures >= self.failure_notice_threshold
    }

    fn note_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    fn note_failure(&mut self, event: &str, err: AttendanceError) -> AttendanceError {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(err.to_string());
        error!(
            "event={event} module=writer status=error consecutive_failures={} error={err}",
            self.consecutive_failures
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::PersistenceWriter;
    use crate::error::AttendanceError;
    use crate::model::record::{
        AttendanceMark, AttendanceRecord, DailyRecord, UpdateSource, ZoneStatus,
    };
    use crate::repo::record_repo::{AttendanceStore, RepoError, RepoResult, UpsertOutcome};
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use uuid::Uuid;

    /// Store double that fails while `failing` is set and keeps one record.
    #[derive(Default)]
    struct FlakyStore {
        failing: Cell<bool>,
        stored: RefCell<Option<AttendanceRecord>>,
    }

    impl AttendanceStore for FlakyStore {
        fn upsert_attendance(&self, record: &AttendanceRecord) -> RepoResult<UpsertOutcome> {
            if self.failing.get() {
                return Err(RepoError::InvalidData("store offline".to_string()));
            }
            let mut stored = self.stored.borrow_mut();
            if let Some(existing) = stored.as_ref() {
                if existing.last_updated > record.last_updated {
                    return Ok(UpsertOutcome::Stale {
                        stored_last_updated: existing.last_updated,
                    });
                }
            }
            *stored = Some(record.clone());
            Ok(UpsertOutcome::Applied)
        }

        fn get_attendance(
            &self,
            _date: NaiveDate,
            _employee_id: &str,
        ) -> RepoResult<Option<AttendanceRecord>> {
            Ok(self.stored.borrow().clone())
        }

        fn list_attendance(&self, _date: NaiveDate) -> RepoResult<Vec<AttendanceRecord>> {
            Ok(self.stored.borrow().iter().cloned().collect())
        }

        fn save_daily_record(&self, _record: &DailyRecord) -> RepoResult<()> {
            if self.failing.get() {
                return Err(RepoError::InvalidData("store offline".to_string()));
            }
            Ok(())
        }

        fn get_daily_record(
            &self,
            _date: NaiveDate,
            _employee_id: &str,
        ) -> RepoResult<Option<DailyRecord>> {
            Ok(None)
        }
    }

    fn record(last_updated: i64, source: UpdateSource) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "uid-1".to_string(),
            name: "jane".to_string(),
            date: "2024-03-04".to_string(),
            day: "Monday".to_string(),
            check_in_time: "09:00 AM".to_string(),
            working_hours: "0h 0m 30s".to_string(),
            attendance: AttendanceMark::Present,
            status: ZoneStatus::InOffice,
            tracking_active: true,
            last_updated,
            update_source: source,
            session_id: Uuid::nil(),
        }
    }

    #[test]
    fn failures_accumulate_until_notice_and_reset_on_success() {
        let mut writer = PersistenceWriter::new(FlakyStore::default(), 2);
        writer.store().failing.set(true);

        let err = writer
            .write(&record(1, UpdateSource::Foreground))
            .expect_err("offline store must fail");
        assert!(matches!(err, AttendanceError::Persistence(_)));
        assert!(!writer.needs_user_notice());

        writer
            .write(&record(2, UpdateSource::Foreground))
            .expect_err("offline store must fail");
        assert!(writer.needs_user_notice());
        assert!(writer.last_error().is_some());

        writer.store().failing.set(false);
        writer
            .write(&record(3, UpdateSource::Foreground))
            .expect("retry should succeed");
        assert_eq!(writer.consecutive_failures(), 0);
        assert!(writer.last_error().is_none());
    }

    #[test]
    fn stale_write_is_reported_without_counting_as_failure() {
        let mut writer = PersistenceWriter::new(FlakyStore::default(), 1);
        writer
            .write(&record(200, UpdateSource::Foreground))
            .expect("first write applies");

        let err = writer
            .write(&record(100, UpdateSource::Background))
            .expect_err("older write must be stale");
        match err {
            AttendanceError::StaleWrite {
                incoming_last_updated,
                stored_last_updated,
            } => {
                assert_eq!(incoming_last_updated, 100);
                assert_eq!(stored_last_updated, 200);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(writer.consecutive_failures(), 0);
        let stored = writer.store().stored.borrow().clone().expect("stored record");
        assert_eq!(stored.update_source, UpdateSource::Foreground);
    }
}
