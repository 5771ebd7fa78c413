use super::*;
use chrono::TimeZone;

fn sample(path: &str, at: DateTime<Utc>) -> NewScreenshot {
    NewScreenshot {
        file_path: path.to_string(),
        file_hash: "abc".to_string(),
        width: 100,
        height: 200,
        screen_id: 1,
        app_name: "Code".to_string(),
        window_title: "main.rs".to_string(),
        created_at: at,
    }
}

#[test]
fn add_and_get_by_path() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let id = mgr.add(sample("/tmp/a.png", at)).unwrap();

    let fetched = mgr.get_by_path("/tmp/a.png").unwrap().unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.app_name, "Code");
    assert!(!fetched.file_deleted);
    assert!(!fetched.processed);
}

#[test]
fn add_is_idempotent_on_duplicate_path() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let id1 = mgr.add(sample("/tmp/a.png", at)).unwrap();
    let id2 = mgr.add(sample("/tmp/a.png", at)).unwrap();
    assert_eq!(id1, id2);
    assert_eq!(mgr.count(false).unwrap(), 1);
}

#[test]
fn unprocessed_newest_first_orders_correctly() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let t1 = t0 + chrono::Duration::seconds(1);
    mgr.add(sample("/tmp/a.png", t0)).unwrap();
    let id2 = mgr.add(sample("/tmp/b.png", t1)).unwrap();

    let batch = mgr.unprocessed_newest_first(10).unwrap();
    assert_eq!(batch[0].id, id2);
}

#[test]
fn mark_processed_excludes_from_unprocessed_query() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let id = mgr.add(sample("/tmp/a.png", at)).unwrap();
    mgr.mark_processed(id).unwrap();
    assert!(mgr.unprocessed_newest_first(10).unwrap().is_empty());
}

#[test]
fn delete_removes_the_row_entirely() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let id = mgr.add(sample("/tmp/a.png", at)).unwrap();
    mgr.delete(id).unwrap();
    assert!(matches!(mgr.get_by_id(id).unwrap_err(), StorageError::NotFound));
}

#[test]
fn get_by_id_missing_row_errors() {
    let store = Store::open_in_memory().unwrap();
    let mgr = ScreenshotManager::new(&store);
    let err = mgr.get_by_id(ScreenshotId::new(999)).unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
