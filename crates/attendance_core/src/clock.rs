//! Wall-clock abstraction for session ticks.
//!
//! # Responsibility
//! - Define the timestamp type shared by session, records and policies.
//! - Provide the system clock and an epoch-millis conversion for callers that
//!   drive ticks from their own clock (the mobile shell).
//!
//! # Invariants
//! - Every `Timestamp` carries its UTC offset, so calendar date, office-hours
//!   time of day and epoch millis all derive from the same value.

use chrono::{DateTime, FixedOffset, Local, Utc};

/// Local wall time with an explicit UTC offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Source of "now" for periodic ticks.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock backed by the device's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().into()
    }
}

/// Builds a timestamp from epoch milliseconds and a UTC offset in minutes.
///
/// Returns `None` when the offset is outside +/-24h or the millis value is out
/// of chrono's representable range.
pub fn timestamp_from_epoch_ms(epoch_ms: i64, utc_offset_minutes: i32) -> Option<Timestamp> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    let utc = DateTime::<Utc>::from_timestamp_millis(epoch_ms)?;
    Some(utc.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::{timestamp_from_epoch_ms, Clock, SystemClock};
    use chrono::{Datelike, Timelike};

    #[test]
    fn epoch_conversion_applies_offset_to_local_fields() {
        // 2024-03-04T03:30:00Z
        let ts = timestamp_from_epoch_ms(1_709_523_000_000, 330).expect("valid timestamp");
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.minute(), 0);
        assert_eq!(ts.day(), 4);
        assert_eq!(ts.timestamp_millis(), 1_709_523_000_000);
    }

    #[test]
    fn epoch_conversion_rejects_out_of_range_offset() {
        assert!(timestamp_from_epoch_ms(0, 24 * 60).is_none());
        assert!(timestamp_from_epoch_ms(0, -24 * 60).is_none());
    }

    #[test]
    fn system_clock_is_close_to_utc_now() {
        let now = SystemClock.now();
        let drift = (chrono::Utc::now().timestamp_millis() - now.timestamp_millis()).abs();
        assert!(drift < 5_000);
    }
}
