use super::*;
use chrono::TimeZone;

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

#[test]
fn opens_new_event_when_none_active() {
    let store = Store::open_in_memory().unwrap();
    let mgr = EventManager::new(&store);
    let id = mgr.get_or_create_event("Code", "main.rs", t(0)).unwrap();
    let event = mgr.get_by_id(id).unwrap();
    assert!(event.is_active());
    assert_eq!(event.start_time, t(0));
}

#[test]
fn same_window_refreshes_end_time_without_new_row() {
    let store = Store::open_in_memory().unwrap();
    let mgr = EventManager::new(&store);
    let id = mgr.get_or_create_event("Code", "main.rs", t(0)).unwrap();
    let id2 = mgr.get_or_create_event("Code", "main.rs", t(2)).unwrap();
    assert_eq!(id, id2);
    let event = mgr.get_by_id(id).unwrap();
    assert_eq!(event.end_time, Some(t(2)));
    assert!(event.is_active());
}

#[test]
fn different_window_closes_previous_and_opens_new() {
    let store = Store::open_in_memory().unwrap();
    let mgr = EventManager::new(&store);
    let first = mgr.get_or_create_event("Code", "T1", t(0)).unwrap();
    let second = mgr.get_or_create_event("Code", "T2", t(2)).unwrap();
    assert_ne!(first, second);

    let closed = mgr.get_by_id(first).unwrap();
    assert_eq!(closed.end_time, Some(t(2)));
    assert!(!closed.is_active());

    let active = mgr.get_by_id(second).unwrap();
    assert!(active.is_active());
    assert_eq!(active.start_time, t(2));
}

#[test]
fn close_active_event_is_idempotent() {
    let store = Store::open_in_memory().unwrap();
    let mgr = EventManager::new(&store);
    mgr.get_or_create_event("Code", "T1", t(0)).unwrap();
    let first_close = mgr.close_active_event(t(5)).unwrap();
    assert!(first_close.is_some());
    let second_close = mgr.close_active_event(t(6)).unwrap();
    assert!(second_close.is_none());
}

#[test]
fn at_most_one_active_event_at_a_time() {
    let store = Store::open_in_memory().unwrap();
    let mgr = EventManager::new(&store);
    mgr.get_or_create_event("A", "1", t(0)).unwrap();
    mgr.get_or_create_event("B", "2", t(1)).unwrap();
    mgr.get_or_create_event("C", "3", t(2)).unwrap();

    let conn = store.conn.lock();
    let active_count: i64 = conn
        .query_row(
            "SELECT count(*) FROM events WHERE end_time IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(active_count, 1);
}

#[test]
fn get_screenshots_returns_only_those_attached_to_the_event() {
    use crate::screenshot::{NewScreenshot, ScreenshotManager};

    let store = Store::open_in_memory().unwrap();
    let event_mgr = EventManager::new(&store);
    let screenshot_mgr = ScreenshotManager::new(&store);

    let event_id = event_mgr.get_or_create_event("Code", "main.rs", t(0)).unwrap();
    let other_event_id = event_mgr.get_or_create_event("Terminal", "zsh", t(10)).unwrap();

    let attached = screenshot_mgr
        .add(NewScreenshot {
            file_path: "/tmp/a.png".into(),
            file_hash: "h1".into(),
            width: 10,
            height: 10,
            screen_id: 1,
            app_name: "Code".into(),
            window_title: "main.rs".into(),
            created_at: t(1),
        })
        .unwrap();
    screenshot_mgr.attach_to_event(attached, event_id.get()).unwrap();

    let unattached = screenshot_mgr
        .add(NewScreenshot {
            file_path: "/tmp/b.png".into(),
            file_hash: "h2".into(),
            width: 10,
            height: 10,
            screen_id: 1,
            app_name: "Terminal".into(),
            window_title: "zsh".into(),
            created_at: t(11),
        })
        .unwrap();
    screenshot_mgr.attach_to_event(unattached, other_event_id.get()).unwrap();

    let screenshots = event_mgr.get_screenshots(event_id).unwrap();
    assert_eq!(screenshots.len(), 1);
    assert_eq!(screenshots[0].id, attached);
}
