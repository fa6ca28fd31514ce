use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Add whole weeks as calendar days (N x 7), never as a fixed duration.
pub fn add_weeks(date: NaiveDate, weeks: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(weeks) * 7))
}

/// Parse a textual date.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp and
/// RFC 3339. Time of day is dropped; RFC 3339 values keep the calendar date
/// of their own offset.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Signed number of days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn add_weeks_adds_calendar_days() {
        assert_eq!(add_weeks(d("2024-01-01"), 13), Some(d("2024-04-01")));
        assert_eq!(add_weeks(d("2024-01-01"), 0), Some(d("2024-01-01")));
    }

    #[test]
    fn add_weeks_crosses_dst_boundary_without_drift() {
        // US DST starts 2024-03-10; a calendar add must land on the same weekday.
        assert_eq!(add_weeks(d("2024-03-04"), 1), Some(d("2024-03-11")));
    }

    #[test]
    fn add_weeks_overflow_is_none() {
        assert_eq!(add_weeks(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2023-01-01"), Some(d("2023-01-01")));
        assert_eq!(parse_date(" 2023-01-01 "), Some(d("2023-01-01")));
        assert_eq!(parse_date("2023-01-01T00:00:00"), Some(d("2023-01-01")));
        assert_eq!(parse_date("2023-01-01T23:15:00.250"), Some(d("2023-01-01")));
        assert_eq!(parse_date("2023-01-01T10:00:00Z"), Some(d("2023-01-01")));
        assert_eq!(parse_date("2023-01-01T23:00:00-05:00"), Some(d("2023-01-01")));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("invalid-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date("01/02/2023"), None);
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(d("2024-01-01"), d("2024-01-08")), 7);
        assert_eq!(days_between(d("2024-01-08"), d("2024-01-01")), -7);
    }

    proptest! {
        #[test]
        fn add_weeks_is_seven_days_per_week(days in 0i64..200_000, weeks in 0u32..520) {
            let base = d("1970-01-01") + chrono::Duration::days(days);
            let result = add_weeks(base, weeks).unwrap();
            prop_assert_eq!(days_between(base, result), i64::from(weeks) * 7);
        }

        #[test]
        fn format_then_parse_is_identity(days in 0i64..200_000) {
            let date = d("1970-01-01") + chrono::Duration::days(days);
            prop_assert_eq!(parse_date(&format_date(date)), Some(date));
        }
    }
}
