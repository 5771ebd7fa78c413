// SPDX-License-Identifier: MIT

//! Job manager (C11), grounded on
//! `original_source/lifetrace/jobs/job_manager.py`: owns the fixed table
//! of background jobs and reacts to config changes by pausing, resuming,
//! or re-intervaling the scheduler entries, never by tearing the
//! scheduler down.

use crate::aggregator::AggregatorJob;
use crate::capture::CaptureJob;
use crate::clean_data::CleanDataJob;
use crate::error::{JobError, JobManagerError};
use crate::ocr_job::OcrJob;
use crate::reminder::ReminderPlanner;
use crate::scheduler::{JobContext, Scheduler};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

pub const RECORDER_JOB: &str = "recorder_job";
pub const OCR_JOB: &str = "ocr_job";
pub const ACTIVITY_AGGREGATOR_JOB: &str = "activity_aggregator_job";
pub const CLEAN_DATA_JOB: &str = "clean_data_job";
pub const TODO_RECORDER_JOB: &str = "todo_recorder_job";
pub const PROACTIVE_OCR_JOB: &str = "proactive_ocr_job";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobToggle {
    pub enabled: bool,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanDataSettings {
    pub enabled: bool,
    pub interval: Duration,
    pub max_screenshots: Option<u64>,
    pub max_days: Option<i64>,
    pub delete_file_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobsConfig {
    pub recorder: JobToggle,
    pub ocr: JobToggle,
    pub activity_aggregator: JobToggle,
    pub clean_data: CleanDataSettings,
    pub todo_recorder: JobToggle,
    pub proactive_ocr: JobToggle,
    /// Linked symmetrically with `todo_recorder.enabled`.
    pub auto_todo_detection_enabled: bool,
    pub deadline_reminder_enabled: bool,
}

pub struct JobManager {
    scheduler: Arc<Scheduler>,
    capture: Arc<CaptureJob>,
    ocr: Arc<OcrJob>,
    aggregator: Arc<AggregatorJob>,
    reminder: Arc<ReminderPlanner>,
    clean_data: Arc<CleanDataJob>,
    config: RwLock<JobsConfig>,
}

impl JobManager {
    pub fn new(
        scheduler: Arc<Scheduler>,
        capture: Arc<CaptureJob>,
        ocr: Arc<OcrJob>,
        aggregator: Arc<AggregatorJob>,
        reminder: Arc<ReminderPlanner>,
        clean_data: Arc<CleanDataJob>,
        config: JobsConfig,
    ) -> Self {
        Self { scheduler, capture, ocr, aggregator, reminder, clean_data, config: RwLock::new(config) }
    }

    /// Register every job function and add each job to the scheduler at
    /// its configured interval, immediately pausing any whose
    /// `<name>.enabled` flag is false. Call once at startup.
    ///
    /// A job already present in the store (i.e. this is a restart, not a
    /// first run) is left alone instead: its persisted pause state and
    /// `next_run_time` are restored into the scheduler's runtime cache
    /// rather than overwritten, so a job paused before the process exited
    /// comes back paused.
    pub fn install(&self) -> Result<(), JobManagerError> {
        self.reminder.install();
        self.register_functions();

        let config = *self.config.read();
        self.add_toggled_job(RECORDER_JOB, config.recorder)?;
        self.add_toggled_job(OCR_JOB, config.ocr)?;
        self.add_toggled_job(ACTIVITY_AGGREGATOR_JOB, config.activity_aggregator)?;
        self.add_toggled_job(
            CLEAN_DATA_JOB,
            JobToggle { enabled: config.clean_data.enabled, interval: config.clean_data.interval },
        )?;
        self.add_toggled_job(TODO_RECORDER_JOB, config.todo_recorder)?;
        self.add_toggled_job(PROACTIVE_OCR_JOB, config.proactive_ocr)?;

        if config.deadline_reminder_enabled {
            self.reminder.sync_all()?;
        }
        Ok(())
    }

    fn add_toggled_job(&self, id: &str, toggle: JobToggle) -> Result<(), crate::error::SchedulerError> {
        if self.scheduler.job_exists(id)? {
            return self.scheduler.restore_job(id);
        }
        self.scheduler.add_interval_job(
            id,
            id,
            toggle.interval,
            id,
            serde_json::json!({}),
            Duration::from_secs(30),
        )?;
        if !toggle.enabled {
            self.scheduler.pause_job(id)?;
        }
        Ok(())
    }

    fn register_functions(&self) {
        let capture = self.capture.clone();
        self.scheduler.register_function(
            RECORDER_JOB,
            Arc::new(move |_ctx: JobContext| {
                let capture = capture.clone();
                Box::pin(async move {
                    capture.tick().await;
                    Ok(())
                })
            }),
        );

        let capture = self.capture.clone();
        self.scheduler.register_function(
            TODO_RECORDER_JOB,
            Arc::new(move |_ctx: JobContext| {
                let capture = capture.clone();
                Box::pin(async move {
                    capture.tick_forcing_todo_detection().await;
                    Ok(())
                })
            }),
        );

        let ocr = self.ocr.clone();
        self.scheduler.register_function(
            OCR_JOB,
            Arc::new(move |_ctx: JobContext| {
                let ocr = ocr.clone();
                Box::pin(async move { ocr.tick().await.map(|_| ()).map_err(JobError::from) })
            }),
        );
        // `proactive_ocr_job` reuses the same OCR tick with a tighter
        // scheduling cadence; the distinction lives entirely in the
        // interval the two job ids are registered with.
        let ocr = self.ocr.clone();
        self.scheduler.register_function(
            PROACTIVE_OCR_JOB,
            Arc::new(move |_ctx: JobContext| {
                let ocr = ocr.clone();
                Box::pin(async move { ocr.tick().await.map(|_| ()).map_err(JobError::from) })
            }),
        );

        let aggregator = self.aggregator.clone();
        self.scheduler.register_function(
            ACTIVITY_AGGREGATOR_JOB,
            Arc::new(move |_ctx: JobContext| {
                let aggregator = aggregator.clone();
                Box::pin(async move { aggregator.tick().await.map(|_| ()).map_err(JobError::from) })
            }),
        );

        let clean_data = self.clean_data.clone();
        self.scheduler.register_function(
            CLEAN_DATA_JOB,
            Arc::new(move |_ctx: JobContext| {
                let clean_data = clean_data.clone();
                Box::pin(async move { clean_data.tick().await.map(|_| ()).map_err(JobError::from) })
            }),
        );
    }

    /// Diff `old` against `new` and reconcile the scheduler: enabled flips
    /// call `pause_job`/`resume_job`, interval changes call
    /// `modify_interval`. Linked flags are equalized before diffing so a
    /// flip on either side of the pair propagates to the other.
    pub fn apply_jobs_change(&self, mut new: JobsConfig) -> Result<(), JobManagerError> {
        let old = { *self.config.read() };
        reconcile_linked_flags(&old, &mut new);

        self.reconcile_toggle(RECORDER_JOB, old.recorder, new.recorder)?;
        self.reconcile_toggle(OCR_JOB, old.ocr, new.ocr)?;
        self.reconcile_toggle(
            ACTIVITY_AGGREGATOR_JOB,
            old.activity_aggregator,
            new.activity_aggregator,
        )?;
        self.reconcile_toggle(
            CLEAN_DATA_JOB,
            JobToggle { enabled: old.clean_data.enabled, interval: old.clean_data.interval },
            JobToggle { enabled: new.clean_data.enabled, interval: new.clean_data.interval },
        )?;
        self.reconcile_toggle(TODO_RECORDER_JOB, old.todo_recorder, new.todo_recorder)?;
        self.reconcile_toggle(PROACTIVE_OCR_JOB, old.proactive_ocr, new.proactive_ocr)?;

        *self.config.write() = new;
        Ok(())
    }

    fn reconcile_toggle(
        &self,
        id: &str,
        old: JobToggle,
        new: JobToggle,
    ) -> Result<(), crate::error::SchedulerError> {
        if old.enabled != new.enabled {
            if new.enabled {
                self.scheduler.resume_job(id)?;
            } else {
                self.scheduler.pause_job(id)?;
            }
        }
        if old.interval != new.interval {
            self.scheduler.modify_interval(id, new.interval)?;
        }
        Ok(())
    }

    pub fn current_config(&self) -> JobsConfig {
        *self.config.read()
    }
}

fn reconcile_linked_flags(old: &JobsConfig, new: &mut JobsConfig) {
    let todo_recorder_flipped = new.todo_recorder.enabled != old.todo_recorder.enabled;
    let auto_todo_flipped = new.auto_todo_detection_enabled != old.auto_todo_detection_enabled;
    if todo_recorder_flipped && !auto_todo_flipped {
        new.auto_todo_detection_enabled = new.todo_recorder.enabled;
    } else if auto_todo_flipped && !todo_recorder_flipped {
        new.todo_recorder.enabled = new.auto_todo_detection_enabled;
    }
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
