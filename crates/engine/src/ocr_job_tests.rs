use super::*;
use chrono::{TimeZone, Utc};
use lt_adapters::ocr::fake::FakeRecognizer;
use lt_adapters::vector::fake::FakeVectorIndex;
use lt_adapters::OcrLine;
use lt_storage::NewScreenshot;

fn seed_screenshot(store: &Store, dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("shot.png");
    image::RgbImage::from_pixel(4, 4, image::Rgb([9, 9, 9]))
        .save(&path)
        .unwrap();
    ScreenshotManager::new(store)
        .add(NewScreenshot {
            file_path: path.display().to_string(),
            file_hash: "x".into(),
            width: 4,
            height: 4,
            screen_id: 1,
            app_name: "Code".into(),
            window_title: "t".into(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap();
    path
}

#[tokio::test]
async fn recognized_text_above_threshold_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_screenshot(&store, dir.path());

    let recognizer = Arc::new(FakeRecognizer::returning(vec![
        OcrLine { text: "hello".into(), confidence: 0.9 },
        OcrLine { text: "quiet".into(), confidence: 0.1 },
    ]));
    let job = OcrJob::new(store.clone(), recognizer, None, OcrConfig {
        processing_delay: Duration::from_millis(0),
        ..OcrConfig::default()
    });

    let summary = job.tick().await.unwrap();
    assert_eq!(summary.processed, 1);

    let screenshots = ScreenshotManager::new(&store).unprocessed_newest_first(10).unwrap();
    assert!(screenshots.is_empty());
}

#[tokio::test]
async fn missing_file_is_skipped_without_failing_the_tick() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    ScreenshotManager::new(&store)
        .add(NewScreenshot {
            file_path: "/nonexistent/path.png".into(),
            file_hash: "x".into(),
            width: 4,
            height: 4,
            screen_id: 1,
            app_name: "Code".into(),
            window_title: "t".into(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap();

    let recognizer = Arc::new(FakeRecognizer::returning(vec![]));
    let job = OcrJob::new(store, recognizer, None, OcrConfig {
        processing_delay: Duration::from_millis(0),
        ..OcrConfig::default()
    });

    let summary = job.tick().await.unwrap();
    assert_eq!(summary.skipped_missing_file, 1);
    assert_eq!(summary.processed, 0);
}

#[tokio::test]
async fn text_is_forwarded_to_the_vector_index_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_screenshot(&store, dir.path());

    let recognizer = Arc::new(FakeRecognizer::returning(vec![
        OcrLine { text: "hello world".into(), confidence: 0.9 },
    ]));
    let vector_index = Arc::new(FakeVectorIndex::new());
    let job = OcrJob::new(
        store,
        recognizer,
        Some(vector_index.clone()),
        OcrConfig { processing_delay: Duration::from_millis(0), ..OcrConfig::default() },
    );

    job.tick().await.unwrap();
    let documents = vector_index.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].text, "hello world");
}
