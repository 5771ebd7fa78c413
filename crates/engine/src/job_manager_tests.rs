use super::*;
use crate::aggregator::AggregatorConfig;
use crate::clean_data::CleanDataConfig;
use crate::ocr_job::OcrConfig;
use crate::scheduler::SqliteJobStore;
use chrono::{TimeZone, Utc};
use lt_adapters::ocr::fake::FakeRecognizer;
use lt_adapters::screen::fake::FakeScreenGrabber;
use lt_adapters::summary::fake::FakeSummaryOracle;
use lt_adapters::todo_detector::fake::FakeTodoDetector;
use lt_adapters::window::fake::FakeWindowProbe;
use lt_adapters::{ActivitySummary, WindowInfo};
use lt_core::FakeClock;

fn toggle(enabled: bool) -> JobToggle {
    JobToggle { enabled, interval: Duration::from_secs(60) }
}

fn manager_with_config(store: Arc<Store>, clock: Arc<FakeClock>, config: JobsConfig) -> (JobManager, Arc<Scheduler>) {
    let clock_dyn: Arc<dyn lt_core::Clock> = clock.clone();
    let job_store: Arc<dyn crate::scheduler::JobStore> = Arc::new(SqliteJobStore::new(store.clone()));
    let scheduler = Scheduler::new(job_store, clock_dyn.clone(), 4);

    let capture = Arc::new(CaptureJob::new(
        store.clone(),
        Arc::new(FakeWindowProbe::new(WindowInfo { app_name: "Code".into(), window_title: "t".into(), screen_id: Some(1) })),
        Arc::new(FakeScreenGrabber::solid(2, 2, [1, 2, 3])),
        Arc::new(FakeTodoDetector::returning(vec![])),
        clock_dyn.clone(),
        crate::capture::CaptureConfig {
            screenshots_dir: std::env::temp_dir(),
            screen_ids: vec![1],
            hash_threshold: 4,
            file_io_timeout: Duration::from_secs(5),
            window_probe_timeout: Duration::from_secs(1),
            blacklist: Default::default(),
            todo_whitelist_apps: vec![],
            auto_todo_detection_enabled: false,
        },
    ));
    let ocr = Arc::new(OcrJob::new(store.clone(), Arc::new(FakeRecognizer::returning(vec![])), None, OcrConfig::default()));
    let aggregator = Arc::new(crate::aggregator::AggregatorJob::new(
        store.clone(),
        Arc::new(FakeSummaryOracle::Returns(ActivitySummary { title: "t".into(), summary: "s".into() })),
        clock_dyn.clone(),
        AggregatorConfig::default(),
    ));
    let reminder = Arc::new(crate::reminder::ReminderPlanner::new(store.clone(), scheduler.clone(), clock_dyn.clone()));
    let clean_data = Arc::new(crate::clean_data::CleanDataJob::new(
        store.clone(),
        clock_dyn,
        CleanDataConfig { max_screenshots: None, max_days: None, delete_file_only: true },
    ));

    let manager = JobManager::new(scheduler.clone(), capture, ocr, aggregator, reminder, clean_data, config);
    (manager, scheduler)
}

fn base_config() -> JobsConfig {
    JobsConfig {
        recorder: toggle(true),
        ocr: toggle(true),
        activity_aggregator: toggle(true),
        clean_data: CleanDataSettings {
            enabled: false,
            interval: Duration::from_secs(3600),
            max_screenshots: None,
            max_days: None,
            delete_file_only: true,
        },
        todo_recorder: toggle(false),
        proactive_ocr: toggle(false),
        auto_todo_detection_enabled: false,
        deadline_reminder_enabled: false,
    }
}

#[test]
fn install_pauses_jobs_whose_enabled_flag_is_false() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let clock = Arc::new(FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let (manager, scheduler) = manager_with_config(store, clock, base_config());
    manager.install().unwrap();

    assert!(scheduler.get_job(TODO_RECORDER_JOB).unwrap().next_run_time.is_some());
    // paused jobs still exist in the store, with next_run_time cleared.
    assert_eq!(scheduler.get_all_jobs().unwrap().len(), 6);
    assert!(scheduler.get_job(PROACTIVE_OCR_JOB).unwrap().next_run_time.is_none());
}

#[test]
fn install_restores_a_paused_job_across_a_restart() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let clock = Arc::new(FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let (manager, scheduler) = manager_with_config(store.clone(), clock.clone(), base_config());
    manager.install().unwrap();
    scheduler.pause_job(RECORDER_JOB).unwrap();
    assert!(scheduler.get_job(RECORDER_JOB).unwrap().next_run_time.is_none());

    // Simulate a restart: a fresh JobManager/Scheduler pair over the same store.
    let (manager2, scheduler2) = manager_with_config(store, clock, base_config());
    manager2.install().unwrap();

    let job = scheduler2.get_job(RECORDER_JOB).unwrap();
    assert!(job.paused);
    assert!(job.next_run_time.is_none());
}

#[test]
fn apply_jobs_change_propagates_linked_flags() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let clock = Arc::new(FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let (manager, _scheduler) = manager_with_config(store, clock, base_config());
    manager.install().unwrap();

    let mut changed = manager.current_config();
    changed.auto_todo_detection_enabled = true;
    manager.apply_jobs_change(changed).unwrap();

    assert!(manager.current_config().todo_recorder.enabled);
}

#[test]
fn apply_jobs_change_updates_interval_on_the_scheduler() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let clock = Arc::new(FakeClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let (manager, scheduler) = manager_with_config(store, clock, base_config());
    manager.install().unwrap();

    let mut changed = manager.current_config();
    changed.ocr.interval = Duration::from_secs(5);
    manager.apply_jobs_change(changed).unwrap();

    let job = scheduler.get_job(OCR_JOB).unwrap();
    assert!(job.trigger_spec.contains("\"seconds\":5"));
}
