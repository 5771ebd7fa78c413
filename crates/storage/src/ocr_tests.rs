use super::*;
use crate::screenshot::{NewScreenshot, ScreenshotManager};
use chrono::TimeZone;

fn seed_screenshot(store: &Store) -> ScreenshotId {
    let mgr = ScreenshotManager::new(store);
    mgr.add(NewScreenshot {
        file_path: "/tmp/a.png".into(),
        file_hash: "x".into(),
        width: 10,
        height: 10,
        screen_id: 1,
        app_name: "Code".into(),
        window_title: "t".into(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    })
    .unwrap()
}

#[test]
fn add_marks_screenshot_processed() {
    let store = Store::open_in_memory().unwrap();
    let screenshot_id = seed_screenshot(&store);
    let ocr = OcrManager::new(&store);

    ocr.add(NewOcrResult {
        screenshot_id,
        text_content: "hello".into(),
        text_hash: Some("h1".into()),
        confidence: 0.9,
        language: "en".into(),
        processing_time_ms: 42,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap(),
    })
    .unwrap();

    let screenshots = ScreenshotManager::new(&store);
    let row = screenshots.get_by_id(screenshot_id).unwrap();
    assert!(row.processed);
}

#[test]
fn reprocessing_is_a_no_op() {
    let store = Store::open_in_memory().unwrap();
    let screenshot_id = seed_screenshot(&store);
    let ocr = OcrManager::new(&store);

    let make = || NewOcrResult {
        screenshot_id,
        text_content: "hello".into(),
        text_hash: Some("h1".into()),
        confidence: 0.9,
        language: "en".into(),
        processing_time_ms: 42,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap(),
    };

    let id1 = ocr.add(make()).unwrap();
    let id2 = ocr.add(make()).unwrap();
    assert_eq!(id1, id2);
}
