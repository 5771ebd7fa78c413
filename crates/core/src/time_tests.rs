use super::*;
use chrono::TimeZone;

#[test]
fn rounds_down_to_15_minute_boundary() {
    let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 46, 59).unwrap();
    let rounded = round_down_15m(t);
    assert_eq!(rounded, Utc.with_ymd_and_hms(2026, 1, 1, 0, 45, 0).unwrap());
}

#[test]
fn exact_boundary_is_unchanged() {
    let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 30, 0).unwrap();
    assert_eq!(round_down_15m(t), t);
}

#[test]
fn zeroes_subseconds() {
    let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 2).unwrap()
        + chrono::Duration::milliseconds(500);
    let rounded = round_down_15m(t);
    assert_eq!(rounded.timestamp_subsec_nanos(), 0);
}
