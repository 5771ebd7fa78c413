// SPDX-License-Identifier: MIT

//! Typed view of the merged config tree, deserialized once at startup via
//! [`crate::config::Config::whole`]. The dotted-path `get`/`set` API stays
//! the source of truth for hot reload; this module only exists so the
//! composition root doesn't have to thread string paths through every
//! worker constructor.

use std::time::Duration;

use serde::Deserialize;

use lt_engine::{CleanDataSettings, JobToggle, JobsConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_dir: String,
    pub database_path: String,
    pub screenshots_dir: String,
    pub logging: LoggingSection,
    pub server: ServerSection,
    pub scheduler: SchedulerSection,
    pub jobs: JobsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    pub log_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    pub max_workers: usize,
    #[allow(dead_code)] // carried for parity with the original scheduler's APScheduler config; not yet surfaced on `Scheduler`
    pub coalesce: bool,
    #[allow(dead_code)]
    pub max_instances: u32,
    #[allow(dead_code)]
    pub misfire_grace_time: u64,
    #[allow(dead_code)]
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsSection {
    pub recorder: JobSection<RecorderParams>,
    pub ocr: JobSection<OcrParams>,
    pub activity_aggregator: JobSection<AggregatorParams>,
    pub clean_data: CleanDataSection,
    pub todo_recorder: ToggleSection,
    pub proactive_ocr: ToggleSection,
    pub auto_todo_detection: EnabledFlag,
    pub deadline_reminder: EnabledFlag,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSection<P> {
    pub enabled: bool,
    pub interval: u64,
    pub params: P,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleSection {
    pub enabled: bool,
    pub interval: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnabledFlag {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecorderParams {
    pub screens: ScreensSpec,
    pub deduplicate: bool,
    pub hash_threshold: u32,
    pub file_io_timeout: u64,
    #[allow(dead_code)] // no direct counterpart on `CaptureConfig`; the database itself has no per-call timeout knob
    pub db_timeout: u64,
    pub window_info_timeout: u64,
    pub auto_exclude_self: bool,
    pub blacklist: BlacklistSection,
}

/// `"all"` or an explicit list of monitor ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScreensSpec {
    All(String),
    Ids(Vec<u32>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistSection {
    #[allow(dead_code)] // disabling the blacklist entirely isn't wired up; an empty entry list has the same effect
    pub enabled: bool,
    pub apps: Vec<String>,
    pub windows: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrParams {
    #[allow(dead_code)] // language selection belongs to a real OCR engine, out of scope for the bundled adapters
    pub language: String,
    pub confidence_threshold: f32,
    pub batch_size: u32,
    pub processing_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorParams {
    pub safety_gap_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanDataSection {
    pub enabled: bool,
    pub interval: u64,
    pub max_screenshots: Option<u64>,
    pub max_days: Option<i64>,
    pub delete_file_only: bool,
}

pub fn jobs_config(jobs: &JobsSection) -> JobsConfig {
    JobsConfig {
        recorder: toggle(jobs.recorder.enabled, jobs.recorder.interval),
        ocr: toggle(jobs.ocr.enabled, jobs.ocr.interval),
        activity_aggregator: toggle(jobs.activity_aggregator.enabled, jobs.activity_aggregator.interval),
        clean_data: CleanDataSettings {
            enabled: jobs.clean_data.enabled,
            interval: Duration::from_secs(jobs.clean_data.interval),
            max_screenshots: jobs.clean_data.max_screenshots,
            max_days: jobs.clean_data.max_days,
            delete_file_only: jobs.clean_data.delete_file_only,
        },
        todo_recorder: toggle(jobs.todo_recorder.enabled, jobs.todo_recorder.interval),
        proactive_ocr: toggle(jobs.proactive_ocr.enabled, jobs.proactive_ocr.interval),
        auto_todo_detection_enabled: jobs.auto_todo_detection.enabled,
        deadline_reminder_enabled: jobs.deadline_reminder.enabled,
    }
}

fn toggle(enabled: bool, interval_secs: u64) -> JobToggle {
    JobToggle { enabled, interval: Duration::from_secs(interval_secs) }
}

#[cfg(test)]
#[path = "app_config_tests.rs"]
mod tests;
