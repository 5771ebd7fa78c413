// SPDX-License-Identifier: MIT

//! File-backed logging setup for the daemon binary, grounded on the
//! `setup_logging`/`rotate_log_if_needed` pair pattern: a single
//! never-rolled file appender, rotated by size at startup rather than by
//! a background timer, behind a non-blocking writer so a slow disk never
//! stalls the scheduler.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::CompositionError;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: usize = 3;

/// Shift `lifetraced.log.2 -> .3`, `.1 -> .2`, current -> `.1`, if the
/// current file has grown past [`MAX_LOG_SIZE`]. Best-effort: a failed
/// rename is silently skipped rather than blocking startup.
pub fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Install a global `tracing` subscriber writing to `log_path`, filtered
/// by `RUST_LOG` (defaulting to `info`). Returns the
/// [`WorkerGuard`] the caller must hold for the process lifetime — dropping
/// it stops the background flush thread.
pub fn setup(log_path: &Path) -> Result<WorkerGuard, CompositionError> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("lifetraced.log"));
    let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
