//! Admin day summary over stored attendance records.

use crate::model::record::{AttendanceMark, AttendanceRecord, CHECK_IN_NOT_MARKED};
use crate::repo::record_repo::{AttendanceStore, RepoResult};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Number of entries shown in the recent-attendance list.
pub const RECENT_LIMIT: usize = 4;
pub const NOT_CHECKED_IN: &str = "Not checked in";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentAttendance {
    pub display_name: String,
    pub time: String,
    pub status: AttendanceMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub total_employees: u32,
    pub present: u32,
    pub absent: u32,
    pub recent: Vec<RecentAttendance>,
}

/// Summarizes one day of records.
///
/// `records` must be ordered oldest first; the recent list keeps the tail.
pub fn summarize_day(records: &[AttendanceRecord], total_employees: u32) -> DaySummary {
    let present_ids: BTreeSet<&str> = records
        .iter()
        .filter(|record| record.attendance == AttendanceMark::Present)
        .map(|record| record.employee_id.as_str())
        .collect();
    let present = u32::try_from(present_ids.len()).unwrap_or(u32::MAX);

    let start = records.len().saturating_sub(RECENT_LIMIT);
    let recent = records[start..]
        .iter()
        .map(|record| RecentAttendance {
            display_name: display_name(&record.name),
            time: recent_time(record),
            status: record.attendance,
        })
        .collect();

    DaySummary {
        total_employees,
        present,
        absent: total_employees.saturating_sub(present),
        recent,
    }
}

/// Loads and summarizes `date` from a store.
pub fn load_day_summary<S: AttendanceStore>(
    store: &S,
    date: NaiveDate,
    total_employees: u32,
) -> RepoResult<DaySummary> {
    let records = store.list_attendance(date)?;
    Ok(summarize_day(&records, total_employees))
}

/// `jane.doe@corp.com` becomes `Jane doe`.
pub fn display_name(raw: &str) -> String {
    let local_part = raw.split('@').next().unwrap_or_default().replace('.', " ");
    let trimmed = local_part.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn recent_time(record: &AttendanceRecord) -> String {
    if record.attendance == AttendanceMark::Present && record.check_in_time != CHECK_IN_NOT_MARKED
    {
        record.check_in_time.clone()
    } else {
        NOT_CHECKED_IN.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{display_name, summarize_day, NOT_CHECKED_IN};
    use crate::model::record::{
        AttendanceMark, AttendanceRecord, UpdateSource, ZoneStatus, CHECK_IN_NOT_MARKED,
    };
    use uuid::Uuid;

    fn record(employee_id: &str, name: &str, present: bool, last_updated: i64) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            name: name.to_string(),
            date: "2024-03-04".to_string(),
            day: "Monday".to_string(),
            check_in_time: if present {
                "09:15 AM".to_string()
            } else {
                CHECK_IN_NOT_MARKED.to_string()
            },
            working_hours: "0h 0m 0s".to_string(),
            attendance: if present {
                AttendanceMark::Present
            } else {
                AttendanceMark::Absent
            },
            status: ZoneStatus::InOffice,
            tracking_active: present,
            last_updated,
            update_source: UpdateSource::Foreground,
            session_id: Uuid::nil(),
        }
    }

    #[test]
    fn counts_distinct_present_employees() {
        let records = vec![
            record("a", "alice", true, 1),
            record("b", "bob", false, 2),
            record("c", "carol", true, 3),
        ];
        let summary = summarize_day(&records, 5);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 3);
    }

    #[test]
    fn absent_never_goes_negative() {
        let records = vec![record("a", "alice", true, 1), record("b", "bob", true, 2)];
        let summary = summarize_day(&records, 1);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 0);
    }

    #[test]
    fn recent_keeps_last_four_records() {
        let records: Vec<_> = (0..6)
            .map(|i| record(&format!("e{i}"), &format!("user{i}"), i % 2 == 0, i))
            .collect();
        let summary = summarize_day(&records, 10);
        let names: Vec<_> = summary
            .recent
            .iter()
            .map(|entry| entry.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["User2", "User3", "User4", "User5"]);
        assert_eq!(summary.recent[0].time, "09:15 AM");
        assert_eq!(summary.recent[1].time, NOT_CHECKED_IN);
        assert_eq!(summary.recent[1].status, AttendanceMark::Absent);
    }

    #[test]
    fn display_name_formats_email_local_part() {
        assert_eq!(display_name("jane.doe@corp.com"), "Jane doe");
        assert_eq!(display_name("sam"), "Sam");
        assert_eq!(display_name(""), "");
    }
}
