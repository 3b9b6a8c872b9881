//! Time window handling and display formatting.
//!
//! All durations are carried in seconds internally; hours appear only at the
//! interface boundary (layover and flight-duration ceilings) and are converted
//! before comparison.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Search window `[start, end]`, timezone-aware.
///
/// Both bounds are inclusive when matching segment departure times, mirroring
/// a SQL `BETWEEN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window; `None` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Build the window for a departure-date range: midnight UTC on the first
    /// day through 23:59:59 UTC on the last.
    pub fn from_dates(date_from: NaiveDate, date_to: NaiveDate) -> Option<Self> {
        let start = Utc.from_utc_datetime(&date_from.and_hms_opt(0, 0, 0)?);
        let end = Utc.from_utc_datetime(&date_to.and_hms_opt(23, 59, 59)?);
        Self::new(start, end)
    }

    /// The same window shifted back by a whole number of days, used for the
    /// previous-period comparison.
    pub fn shifted_back(&self, days: i64) -> Self {
        Self {
            start: self.start - Duration::days(days),
            end: self.end - Duration::days(days),
        }
    }

    /// Whether an instant falls inside the window (inclusive bounds).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Format a duration in seconds as `"x hr y min"`.
///
/// Sub-minute remainders are dropped and a zero-hour prefix is omitted, so
/// 5400 s renders as `"1 hr 30 min"` and 2700 s as `"45 min"`.
pub fn format_duration(seconds: i64) -> String {
    let whole_minutes = seconds / 60;
    let hrs = whole_minutes / 60;
    let mins = whole_minutes % 60;
    if hrs == 0 {
        format!("{} min", mins)
    } else {
        format!("{} hr {} min", hrs, mins)
    }
}

/// Format an instant as `HH:MM` for display.
pub fn format_hhmm(instant: DateTime<Utc>) -> String {
    instant.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_window_ordering_enforced() {
        let a = utc(2024, 1, 1, 0, 0);
        let b = utc(2024, 1, 2, 0, 0);
        assert!(TimeWindow::new(a, b).is_some());
        assert!(TimeWindow::new(b, a).is_none());
        assert!(TimeWindow::new(a, a).is_none());
    }

    #[test]
    fn test_window_from_dates_spans_full_days() {
        let window = TimeWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(window.start, utc(2024, 1, 1, 0, 0));
        assert!(window.contains(utc(2024, 1, 2, 23, 59)));
        assert!(!window.contains(utc(2024, 1, 3, 0, 0)));
    }

    #[test]
    fn test_window_shifted_back() {
        let window = TimeWindow::new(utc(2024, 1, 8, 0, 0), utc(2024, 1, 9, 0, 0)).unwrap();
        let prev = window.shifted_back(7);
        assert_eq!(prev.start, utc(2024, 1, 1, 0, 0));
        assert_eq!(prev.end, utc(2024, 1, 2, 0, 0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = TimeWindow::new(utc(2024, 1, 1, 8, 0), utc(2024, 1, 1, 20, 0)).unwrap();
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(utc(2024, 1, 1, 20, 1)));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5400), "1 hr 30 min");
        assert_eq!(format_duration(2700), "45 min");
        assert_eq!(format_duration(43200), "12 hr 0 min");
        assert_eq!(format_duration(59), "0 min");
        // Sub-minute remainder is dropped, not rounded
        assert_eq!(format_duration(5459), "1 hr 30 min");
    }

    #[test]
    fn test_format_hhmm() {
        assert_eq!(format_hhmm(utc(2024, 1, 1, 8, 5)), "08:05");
        assert_eq!(format_hhmm(utc(2024, 1, 1, 23, 59)), "23:59");
    }
}
