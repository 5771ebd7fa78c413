use super::*;
use crate::event::EventManager;
use chrono::TimeZone;

fn t(mins: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(mins)
}

#[test]
fn get_unprocessed_events_excludes_linked_events() {
    let store = Store::open_in_memory().unwrap();
    let events = EventManager::new(&store);
    let activities = ActivityManager::new(&store);

    let e1 = events.get_or_create_event("A", "1", t(0)).unwrap();
    events.close_active_event(t(3)).unwrap();

    let unprocessed = activities.get_unprocessed_events(t(0)).unwrap();
    assert_eq!(unprocessed.len(), 1);

    activities
        .create(t(0), t(15), "title", "summary", &[e1])
        .unwrap();

    let unprocessed = activities.get_unprocessed_events(t(0)).unwrap();
    assert!(unprocessed.is_empty());
}

#[test]
fn activity_exists_for_time_window_detects_exact_match() {
    let store = Store::open_in_memory().unwrap();
    let events = EventManager::new(&store);
    let activities = ActivityManager::new(&store);
    let e1 = events.get_or_create_event("A", "1", t(0)).unwrap();
    events.close_active_event(t(5)).unwrap();

    assert!(!activities.activity_exists_for_time_window(t(0), t(15)).unwrap());
    activities.create(t(0), t(15), "x", "y", &[e1]).unwrap();
    assert!(activities.activity_exists_for_time_window(t(0), t(15)).unwrap());
}

#[test]
fn create_rejects_empty_event_list() {
    let store = Store::open_in_memory().unwrap();
    let activities = ActivityManager::new(&store);
    let err = activities.create(t(0), t(15), "x", "y", &[]).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

#[test]
fn activities_never_overlap_for_repeated_window_create_attempts() {
    let store = Store::open_in_memory().unwrap();
    let events = EventManager::new(&store);
    let activities = ActivityManager::new(&store);
    let e1 = events.get_or_create_event("A", "1", t(0)).unwrap();
    events.close_active_event(t(5)).unwrap();

    activities.create(t(0), t(15), "x", "y", &[e1]).unwrap();
    // A second attempt to create over the same window must be guarded by
    // the caller checking activity_exists_for_time_window first; verify the
    // check reports true so the aggregator would skip.
    assert!(activities.activity_exists_for_time_window(t(0), t(15)).unwrap());
}
