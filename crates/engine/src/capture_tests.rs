use super::*;
use lt_adapters::screen::fake::FakeScreenGrabber;
use lt_adapters::todo_detector::fake::FakeTodoDetector;
use lt_adapters::window::fake::FakeWindowProbe;
use lt_adapters::WindowInfo;
use lt_core::SystemClock;
use lt_storage::Store;

fn config(dir: &std::path::Path) -> CaptureConfig {
    CaptureConfig {
        screenshots_dir: dir.to_path_buf(),
        screen_ids: vec![1],
        hash_threshold: 4,
        file_io_timeout: Duration::from_secs(5),
        window_probe_timeout: Duration::from_secs(1),
        blacklist: BlacklistConfig { self_patterns: vec![], entries: vec!["slack".into()] },
        todo_whitelist_apps: vec!["Code".into()],
        auto_todo_detection_enabled: true,
    }
}

fn job(
    dir: &std::path::Path,
    window: WindowInfo,
    pixel: [u8; 3],
) -> CaptureJob {
    CaptureJob::new(
        Arc::new(Store::open_in_memory().unwrap()),
        Arc::new(FakeWindowProbe::new(window)),
        Arc::new(FakeScreenGrabber::solid(4, 4, pixel)),
        Arc::new(FakeTodoDetector::returning(vec![])),
        Arc::new(SystemClock),
        config(dir),
    )
}

#[tokio::test]
async fn captures_and_persists_a_new_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let window = WindowInfo { app_name: "Code".into(), window_title: "main.rs".into(), screen_id: Some(1) };
    let capture = job(dir.path(), window, [10, 20, 30]);

    let outcome = capture.tick().await;
    assert!(matches!(outcome, CaptureOutcome::Captured { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn identical_frame_on_same_screen_is_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let window = WindowInfo { app_name: "Code".into(), window_title: "main.rs".into(), screen_id: Some(1) };
    let capture = job(dir.path(), window, [10, 20, 30]);

    capture.tick().await;
    let second = capture.tick().await;
    assert_eq!(second, CaptureOutcome::Duplicate);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn blacklisted_window_is_skipped_and_closes_active_event() {
    let dir = tempfile::tempdir().unwrap();
    let window = WindowInfo { app_name: "Slack".into(), window_title: "general".into(), screen_id: Some(1) };
    let capture = job(dir.path(), window, [1, 2, 3]);

    let outcome = capture.tick().await;
    assert!(matches!(outcome, CaptureOutcome::Skipped(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn screen_outside_configured_set_is_skipped_and_closes_active_event() {
    let dir = tempfile::tempdir().unwrap();
    // `config()` only configures screen_ids: vec![1].
    let window = WindowInfo { app_name: "Code".into(), window_title: "main.rs".into(), screen_id: Some(2) };
    let capture = job(dir.path(), window, [1, 2, 3]);

    let outcome = capture.tick().await;
    assert_eq!(outcome, CaptureOutcome::ScreenNotConfigured);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unresolvable_screen_id_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let window = WindowInfo { app_name: "Code".into(), window_title: "main.rs".into(), screen_id: None };
    let capture = job(dir.path(), window, [1, 2, 3]);

    let outcome = capture.tick().await;
    assert_eq!(outcome, CaptureOutcome::ScreenNotConfigured);
}

#[tokio::test]
async fn startup_sweep_imports_orphaned_png_files() {
    let dir = tempfile::tempdir().unwrap();
    let orphan_path = dir.path().join("orphan.png");
    let image = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
    image.save(&orphan_path).unwrap();

    let window = WindowInfo { app_name: "Code".into(), window_title: "main.rs".into(), screen_id: Some(1) };
    let capture = job(dir.path(), window, [1, 2, 3]);

    let imported = capture.startup_sweep().unwrap();
    assert_eq!(imported, 1);
    // Running again must not double-import the same file.
    assert_eq!(capture.startup_sweep().unwrap(), 0);
}
