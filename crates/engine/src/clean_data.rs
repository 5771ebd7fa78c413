// SPDX-License-Identifier: MIT

//! Retention job (the `clean_data_job` entry in C11), grounded on
//! `original_source/lifetrace/jobs/clean_data.py`.

use crate::error::CleanDataError;
use lt_core::Clock;
use lt_storage::{Screenshot, ScreenshotManager, Store};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanDataOutcome {
    pub deleted_files: u32,
    pub deleted_records: u32,
    pub freed_bytes: u64,
}

pub struct CleanDataConfig {
    pub max_screenshots: Option<u64>,
    pub max_days: Option<i64>,
    /// `true`: unlink the file and mark `file_deleted`, keep the row.
    /// `false`: unlink the file and delete the row outright.
    pub delete_file_only: bool,
}

pub struct CleanDataJob {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    config: CleanDataConfig,
}

impl CleanDataJob {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, config: CleanDataConfig) -> Self {
        Self { store, clock, config }
    }

    pub async fn tick(&self) -> Result<CleanDataOutcome, CleanDataError> {
        let mut outcome = CleanDataOutcome::default();

        if let Some(max_screenshots) = self.config.max_screenshots {
            outcome = outcome + self.clean_by_count(max_screenshots)?;
        }
        if let Some(max_days) = self.config.max_days {
            outcome = outcome + self.clean_by_age(max_days)?;
        }
        Ok(outcome)
    }

    fn clean_by_count(&self, max_screenshots: u64) -> Result<CleanDataOutcome, CleanDataError> {
        let manager = ScreenshotManager::new(&self.store);
        let total = manager.count(true)?;
        if total <= max_screenshots {
            return Ok(CleanDataOutcome::default());
        }
        let to_delete = (total - max_screenshots) as u32;
        let candidates = manager.iter_oldest(to_delete)?;
        self.delete_all(&manager, candidates)
    }

    fn clean_by_age(&self, max_days: i64) -> Result<CleanDataOutcome, CleanDataError> {
        let cutoff = self.clock.now_utc() - chrono::Duration::days(max_days);
        let manager = ScreenshotManager::new(&self.store);
        let candidates: Vec<Screenshot> = manager
            .iter_oldest(u32::MAX)?
            .into_iter()
            .filter(|s| !s.file_deleted && s.created_at < cutoff)
            .collect();
        self.delete_all(&manager, candidates)
    }

    fn delete_all(
        &self,
        manager: &ScreenshotManager<'_>,
        screenshots: Vec<Screenshot>,
    ) -> Result<CleanDataOutcome, CleanDataError> {
        let mut outcome = CleanDataOutcome::default();
        for screenshot in screenshots {
            if screenshot.file_deleted {
                continue;
            }
            let path = std::path::Path::new(&screenshot.file_path);
            if path.exists() {
                let size = path.metadata().map(|m| m.len()).unwrap_or(0);
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(screenshot_id = screenshot.id.get(), error = %e, "failed to remove screenshot file");
                    continue;
                }
                outcome.freed_bytes += size;
            }
            outcome.deleted_files += 1;

            if self.config.delete_file_only {
                manager.mark_file_deleted(screenshot.id)?;
            } else {
                manager.delete(screenshot.id)?;
                outcome.deleted_records += 1;
            }
        }
        Ok(outcome)
    }
}

impl std::ops::Add for CleanDataOutcome {
    type Output = CleanDataOutcome;
    fn add(self, rhs: CleanDataOutcome) -> CleanDataOutcome {
        CleanDataOutcome {
            deleted_files: self.deleted_files + rhs.deleted_files,
            deleted_records: self.deleted_records + rhs.deleted_records,
            freed_bytes: self.freed_bytes + rhs.freed_bytes,
        }
    }
}

#[cfg(test)]
#[path = "clean_data_tests.rs"]
mod tests;
