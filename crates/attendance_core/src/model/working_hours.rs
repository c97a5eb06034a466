//! Working-hours display formatting.

use chrono::Duration;

/// Display value for an empty or reset session.
pub const ZERO_WORKING_HOURS: &str = "0h 0m 0s";

/// Formats a duration as `<H>h <M>m <S>s`.
///
/// Negative durations are rendered as zero; hours are not wrapped at 24.
pub fn format_working_hours(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
