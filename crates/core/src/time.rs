// SPDX-License-Identifier: MIT

//! Time math shared by the activity aggregator and reminder planner.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// Round a timestamp down to the nearest 15-minute wall-clock boundary,
/// zeroing minutes (mod 15), seconds, and subseconds.
pub fn round_down_15m(t: DateTime<Utc>) -> DateTime<Utc> {
    let rounded_minute = (t.minute() / 15) * 15;
    t.with_minute(rounded_minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Treat a naive timestamp (no timezone) as already being UTC.
pub fn naive_as_utc(t: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(t, Utc)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
