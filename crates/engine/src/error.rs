// SPDX-License-Identifier: MIT

//! Per-concern error enums. Only `Composition::build` in `lt-daemon` is
//! allowed to propagate these out of `main`; everywhere else they are
//! logged and swallowed at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no job with id {0}")]
    NotFound(String),
    #[error("job {0} is already registered")]
    AlreadyExists(String),
    #[error("unknown job function {0}")]
    UnknownFunction(String),
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job function panicked")]
    Panicked,
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
    #[error(transparent)]
    Reminder(#[from] ReminderError),
    #[error(transparent)]
    CleanData(#[from] CleanDataError),
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen grab failed: {0}")]
    Grab(#[from] lt_adapters::ScreenError),
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("file io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("recognizer unavailable")]
    Unavailable,
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
    #[error("file io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

#[derive(Debug, Error)]
pub enum CleanDataError {
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
    #[error("file io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum JobManagerError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Reminder(#[from] ReminderError),
}
