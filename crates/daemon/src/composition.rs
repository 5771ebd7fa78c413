// SPDX-License-Identifier: MIT

//! Composition root. One `Composition` owns the storage handle, clock,
//! config snapshot, scheduler, and job manager — every worker is wired up
//! here, once, at startup; nothing reaches for a global.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lt_adapters::{NullRecognizer, NullSummaryOracle, NullTodoDetector, SystemScreenGrabber, SystemWindowProbe};
use lt_core::{Clock, SystemClock};
use lt_engine::{
    AggregatorConfig, AggregatorJob, BlacklistConfig, CaptureConfig, CaptureJob, CleanDataConfig, CleanDataJob,
    JobManager, OcrConfig, OcrJob, ReminderPlanner, Scheduler, SqliteJobStore, TraceSink, TraceSinkConfig,
};
use lt_storage::Store;

use crate::app_config::{self, AppConfig, ScreensSpec};
use crate::config::{ChangeType, Config, ConfigPaths};
use crate::error::CompositionError;

const SELF_PATTERNS: &[&str] = &["lifetrace", "lifetraced"];

/// Every long-lived handle the daemon binary needs, assembled from a data
/// directory. Construction is infallible-by-convention: anything that can
/// fail (opening the database, reading config, building the job manager)
/// surfaces as a [`CompositionError`] instead of panicking.
pub struct Composition {
    pub store: Arc<Store>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
    pub scheduler: Arc<Scheduler>,
    pub job_manager: Arc<JobManager>,
    pub trace_sink: Arc<TraceSink>,
    pub server_host: String,
    pub server_port: u16,
}

impl Composition {
    pub fn build(data_dir: PathBuf) -> Result<Self, CompositionError> {
        Self::build_with_overrides(data_dir, &[])
    }

    /// Build with one-shot config overrides applied (not persisted to
    /// `config.yaml`) before any worker is constructed — used by the CLI's
    /// `--host`/`--port`/`--interval`/`--screens` flags.
    pub fn build_with_overrides(
        data_dir: PathBuf,
        overrides: &[(&str, serde_yaml::Value)],
    ) -> Result<Self, CompositionError> {
        std::fs::create_dir_all(&data_dir)?;

        let config = Arc::new(Config::load(ConfigPaths::under_config_dir(data_dir.join("config")))?);
        for (path, value) in overrides {
            config.set(path, value.clone(), false)?;
        }
        let app: AppConfig = config.whole()?;

        let base_dir = data_dir.join(&app.base_dir);
        std::fs::create_dir_all(&base_dir)?;
        let screenshots_dir = base_dir.join(&app.screenshots_dir);
        std::fs::create_dir_all(&screenshots_dir)?;

        let store = Arc::new(Store::open(base_dir.join(&app.database_path))?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let job_store = Arc::new(SqliteJobStore::new(store.clone()));
        let scheduler = Scheduler::new(job_store, clock.clone(), app.scheduler.max_workers);

        let capture = Arc::new(CaptureJob::new(
            store.clone(),
            Arc::new(SystemWindowProbe::new()),
            Arc::new(SystemScreenGrabber::new()),
            Arc::new(NullTodoDetector),
            clock.clone(),
            capture_config(&app, screenshots_dir),
        ));
        let ocr = Arc::new(OcrJob::new(store.clone(), Arc::new(NullRecognizer), None, ocr_config(&app)));
        let aggregator =
            Arc::new(AggregatorJob::new(store.clone(), Arc::new(NullSummaryOracle), clock.clone(), aggregator_config(&app)));
        let reminder = Arc::new(ReminderPlanner::new(store.clone(), scheduler.clone(), clock.clone()));
        let clean_data = Arc::new(CleanDataJob::new(store.clone(), clock.clone(), clean_data_config(&app)));

        let job_manager = Arc::new(JobManager::new(
            scheduler.clone(),
            capture,
            ocr,
            aggregator,
            reminder,
            clean_data,
            app_config::jobs_config(&app.jobs),
        ));
        job_manager.install()?;

        {
            let job_manager = job_manager.clone();
            config.register_handler(
                ChangeType::Jobs,
                Arc::new(move |_change, _old, new| {
                    let Ok(jobs) = serde_yaml::from_value::<app_config::JobsSection>(
                        new.get("jobs").cloned().unwrap_or(serde_yaml::Value::Null),
                    ) else {
                        tracing::warn!("config reload: jobs section no longer parses, keeping previous schedule");
                        return;
                    };
                    if let Err(error) = job_manager.apply_jobs_change(app_config::jobs_config(&jobs)) {
                        tracing::warn!(%error, "failed to reconcile jobs after config reload");
                    }
                }),
            );
        }

        let trace_sink = Arc::new(TraceSink::new(TraceSinkConfig {
            traces_dir: base_dir.join("traces"),
            max_files: 200,
            session_id: clock.now_utc().format("%Y%m%dT%H%M%S").to_string(),
        }));

        Ok(Self {
            store,
            clock,
            config,
            scheduler,
            job_manager,
            trace_sink,
            server_host: app.server.host,
            server_port: app.server.port,
        })
    }
}

fn capture_config(app: &AppConfig, screenshots_dir: PathBuf) -> CaptureConfig {
    let recorder = &app.jobs.recorder.params;
    let screen_ids = match &recorder.screens {
        ScreensSpec::All(_) => Vec::new(),
        ScreensSpec::Ids(ids) => ids.clone(),
    };

    let mut self_patterns: Vec<String> = SELF_PATTERNS.iter().map(|s| s.to_string()).collect();
    if !recorder.auto_exclude_self {
        self_patterns.clear();
    }

    CaptureConfig {
        screenshots_dir,
        screen_ids,
        hash_threshold: recorder.hash_threshold,
        file_io_timeout: Duration::from_secs(recorder.file_io_timeout),
        window_probe_timeout: Duration::from_secs(recorder.window_info_timeout),
        blacklist: BlacklistConfig {
            self_patterns,
            entries: recorder.blacklist.apps.iter().chain(recorder.blacklist.windows.iter()).cloned().collect(),
        },
        todo_whitelist_apps: Vec::new(),
        auto_todo_detection_enabled: app.jobs.auto_todo_detection.enabled,
    }
}

fn ocr_config(app: &AppConfig) -> OcrConfig {
    let params = &app.jobs.ocr.params;
    OcrConfig {
        batch_size: params.batch_size,
        confidence_threshold: params.confidence_threshold,
        processing_delay: Duration::from_millis(params.processing_delay_ms),
    }
}

fn aggregator_config(app: &AppConfig) -> AggregatorConfig {
    AggregatorConfig { safety_gap: chrono::Duration::seconds(app.jobs.activity_aggregator.params.safety_gap_seconds) }
}

fn clean_data_config(app: &AppConfig) -> CleanDataConfig {
    let section = &app.jobs.clean_data;
    CleanDataConfig {
        max_screenshots: section.max_screenshots,
        max_days: section.max_days,
        delete_file_only: section.delete_file_only,
    }
}

#[cfg(test)]
#[path = "composition_tests.rs"]
mod tests;
