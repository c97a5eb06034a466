//! Daily office-hours window.

use chrono::NaiveTime;

/// Inclusive daily window in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for OfficeHours {
    /// 09:00 to 18:00.
    fn default() -> Self {
        Self {
            start: NaiveTime::default() + chrono::Duration::hours(9),
            end: NaiveTime::default() + chrono::Duration::hours(18),
        }
    }
}

impl OfficeHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Returns whether `time` falls within `[start, end]`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::OfficeHours;
    use chrono::NaiveTime;

    fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).expect("valid time")
    }

    #[test]
    fn default_window_is_nine_to_six() {
        let hours = OfficeHours::default();
        assert_eq!(hours.start, time(9, 0, 0));
        assert_eq!(hours.end, time(18, 0, 0));
    }

    #[test]
    fn bounds_are_inclusive() {
        let hours = OfficeHours::default();
        assert!(hours.contains(time(9, 0, 0)));
        assert!(hours.contains(time(18, 0, 0)));
        assert!(!hours.contains(time(8, 59, 59)));
        assert!(!hours.contains(time(18, 0, 1)));
    }
}
