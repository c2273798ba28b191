// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timestamp helpers for API responses and fixture dates.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with second precision and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The instant `days` whole days before `now`.
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_truncates_to_seconds() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 5).unwrap()
            + Duration::milliseconds(750);
        assert_eq!(format_utc_rfc3339(date), "2024-01-15T10:30:05Z");
    }

    #[test]
    fn test_days_before_crosses_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            days_before(now, 30),
            Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()
        );
        assert_eq!(days_before(now, 0), now);
    }
}
