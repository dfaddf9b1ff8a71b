// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Sessions are scheduled in wall-clock time of the server's zone, so
//! "today" and "now" for booking rules are local, not UTC.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current local date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2026, 3, 10, 14, 5, 9).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2026-03-10T14:05:09Z");
    }

    #[test]
    fn test_local_now_is_today() {
        let now = local_now();
        let today = local_today();
        // Tolerate a midnight rollover between the two calls
        assert!(now.date() == today || now.date().succ_opt() == Some(today));
    }
}
