use super::*;
use chrono::{TimeZone, Utc};
use lt_core::FakeClock;
use lt_storage::NewScreenshot;

fn seed(store: &Store, dir: &std::path::Path, name: &str, created_at: chrono::DateTime<Utc>) -> Screenshot {
    let path = dir.join(name);
    image::RgbImage::from_pixel(2, 2, image::Rgb([1, 1, 1])).save(&path).unwrap();
    let mgr = ScreenshotManager::new(store);
    let id = mgr
        .add(NewScreenshot {
            file_path: path.display().to_string(),
            file_hash: "x".into(),
            width: 2,
            height: 2,
            screen_id: 1,
            app_name: "Code".into(),
            window_title: "t".into(),
            created_at,
        })
        .unwrap();
    mgr.get_by_id(id).unwrap()
}

#[tokio::test]
async fn clean_by_count_marks_the_oldest_as_file_deleted_when_over_the_cap() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open_in_memory().unwrap());
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    seed(&store, dir.path(), "a.png", t0);
    seed(&store, dir.path(), "b.png", t0 + chrono::Duration::seconds(1));

    let job = CleanDataJob::new(
        store.clone(),
        Arc::new(FakeClock::new(t0)),
        CleanDataConfig { max_screenshots: Some(1), max_days: None, delete_file_only: true },
    );
    let outcome = job.tick().await.unwrap();
    assert_eq!(outcome.deleted_files, 1);
    assert_eq!(outcome.deleted_records, 0);

    let remaining = ScreenshotManager::new(&store).count(true).unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn clean_by_age_deletes_the_row_when_delete_file_only_is_false() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open_in_memory().unwrap());
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let old = seed(&store, dir.path(), "old.png", t0);

    let job = CleanDataJob::new(
        store.clone(),
        Arc::new(FakeClock::new(t0 + chrono::Duration::days(40))),
        CleanDataConfig { max_screenshots: None, max_days: Some(30), delete_file_only: false },
    );
    let outcome = job.tick().await.unwrap();
    assert_eq!(outcome.deleted_files, 1);
    assert_eq!(outcome.deleted_records, 1);

    assert!(matches!(
        ScreenshotManager::new(&store).get_by_id(old.id).unwrap_err(),
        lt_storage::StorageError::NotFound
    ));
}

#[tokio::test]
async fn recent_screenshots_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open_in_memory().unwrap());
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    seed(&store, dir.path(), "fresh.png", t0);

    let job = CleanDataJob::new(
        store.clone(),
        Arc::new(FakeClock::new(t0 + chrono::Duration::hours(1))),
        CleanDataConfig { max_screenshots: Some(100), max_days: Some(30), delete_file_only: true },
    );
    let outcome = job.tick().await.unwrap();
    assert_eq!(outcome.deleted_files, 0);
}
