// SPDX-License-Identifier: MIT

//! Background pipeline workers: capture, OCR, activity aggregation,
//! scheduling, reminders, job orchestration, retention, and tracing.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod aggregator;
pub mod blacklist;
pub mod capture;
pub mod clean_data;
pub mod error;
pub mod job_manager;
pub mod ocr_job;
pub mod phash;
pub mod reminder;
pub mod scheduler;
pub mod trace_sink;

pub use aggregator::{AggregatorConfig, AggregatorJob, AggregatorTickSummary};
pub use blacklist::{BlacklistConfig, BlacklistReason};
pub use capture::{CaptureConfig, CaptureJob, CaptureOutcome};
pub use clean_data::{CleanDataConfig, CleanDataJob, CleanDataOutcome};
pub use error::{
    AggregatorError, CaptureError, CleanDataError, JobError, JobManagerError, OcrError,
    ReminderError, SchedulerError,
};
pub use job_manager::{CleanDataSettings, JobManager, JobToggle, JobsConfig};
pub use ocr_job::{OcrConfig, OcrJob, OcrTickSummary};
pub use phash::PHash;
pub use reminder::ReminderPlanner;
pub use scheduler::{JobContext, JobStore, Scheduler, SchedulerEvent, SqliteJobStore, Trigger};
pub use trace_sink::{LlmCall, Span, ToolCall, TraceSink, TraceSinkConfig};
