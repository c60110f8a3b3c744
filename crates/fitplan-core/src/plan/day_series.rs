//! Calendar-day series expansion.

use chrono::{DateTime, Days, NaiveTime, Utc};

/// Plans longer than this only get their first 60 days materialized; the
/// plan's own end date still reflects the full requested length.
pub const MAX_MATERIALIZED_DAYS: u32 = 60;

/// Expand a start instant and a requested day count into ordered day
/// markers, one per day, each normalized to 00:00:00 UTC.
///
/// Marker `i` is the calendar day of `start + i days`; the count is capped
/// at [`MAX_MATERIALIZED_DAYS`]. Pure function of its inputs.
pub fn day_series(start: DateTime<Utc>, days: u32) -> Vec<DateTime<Utc>> {
    let count = days.min(MAX_MATERIALIZED_DAYS);

    (0..count)
        .map(|i| {
            let day = start
                .checked_add_days(Days::new(u64::from(i)))
                .unwrap_or(start);
            day.date_naive().and_time(NaiveTime::MIN).and_utc()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn produces_one_marker_per_day() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 5).unwrap();
        let series = day_series(start, 10);
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn caps_at_sixty_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(day_series(start, 365).len(), 60);
        assert_eq!(day_series(start, 60).len(), 60);
        assert_eq!(day_series(start, 0).len(), 0);
    }

    #[test]
    fn markers_are_midnight_utc() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        for marker in day_series(start, 5) {
            assert_eq!(marker.hour(), 0);
            assert_eq!(marker.minute(), 0);
            assert_eq!(marker.second(), 0);
        }
    }

    #[test]
    fn markers_increase_by_exactly_one_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 27, 8, 0, 0).unwrap();
        let series = day_series(start, 5);
        for pair in series.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
        // Crosses the Feb 29 leap boundary.
        assert_eq!(series[2].date_naive().to_string(), "2024-02-29");
    }

    #[test]
    fn first_marker_is_start_calendar_day() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 5).unwrap();
        let series = day_series(start, 3);
        assert_eq!(series[0].date_naive(), start.date_naive());
    }
}
