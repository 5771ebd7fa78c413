// SPDX-License-Identifier: MIT

//! Screenshot entity and manager (C3 `screenshot_mgr`).

use crate::error::{Result, StorageError};
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

lt_core::define_row_id! {
    /// Primary key of a `screenshots` row.
    pub struct ScreenshotId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub id: ScreenshotId,
    pub file_path: String,
    pub file_hash: String,
    pub width: u32,
    pub height: u32,
    pub screen_id: i64,
    pub app_name: String,
    pub window_title: String,
    pub created_at: DateTime<Utc>,
    pub file_deleted: bool,
    pub event_id: Option<i64>,
    pub processed: bool,
}

/// Fields required to insert a new screenshot row.
pub struct NewScreenshot {
    pub file_path: String,
    pub file_hash: String,
    pub width: u32,
    pub height: u32,
    pub screen_id: i64,
    pub app_name: String,
    pub window_title: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn row_to_screenshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Screenshot> {
    Ok(Screenshot {
        id: ScreenshotId::new(row.get(0)?),
        file_path: row.get(1)?,
        file_hash: row.get(2)?,
        width: row.get::<_, i64>(3)? as u32,
        height: row.get::<_, i64>(4)? as u32,
        screen_id: row.get(5)?,
        app_name: row.get(6)?,
        window_title: row.get(7)?,
        created_at: row.get(8)?,
        file_deleted: row.get::<_, i64>(9)? != 0,
        event_id: row.get(10)?,
        processed: row.get::<_, i64>(11)? != 0,
    })
}

pub(crate) const SELECT_COLUMNS: &str = "id, file_path, file_hash, width, height, screen_id, app_name, \
     window_title, created_at, file_deleted, event_id, processed";

pub struct ScreenshotManager<'a> {
    store: &'a Store,
}

impl<'a> ScreenshotManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new screenshot row. A duplicate `file_path` is treated as
    /// success, returning the pre-existing row's id.
    pub fn add(&self, new: NewScreenshot) -> Result<ScreenshotId> {
        self.store.with_tx(|tx| {
            if let Some(existing) = tx
                .query_row(
                    "SELECT id FROM screenshots WHERE file_path = ?1",
                    params![new.file_path],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?
            {
                return Ok(ScreenshotId::new(existing));
            }

            tx.execute(
                "INSERT INTO screenshots (file_path, file_hash, width, height, screen_id, \
                 app_name, window_title, created_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
                params![
                    new.file_path,
                    new.file_hash,
                    new.width as i64,
                    new.height as i64,
                    new.screen_id,
                    new.app_name,
                    new.window_title,
                    new.created_at,
                ],
            )?;
            Ok(ScreenshotId::new(tx.last_insert_rowid()))
        })
    }

    pub fn get_by_path(&self, file_path: &str) -> Result<Option<Screenshot>> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM screenshots WHERE file_path = ?1");
            tx.query_row(&sql, params![file_path], row_to_screenshot)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn get_by_id(&self, id: ScreenshotId) -> Result<Screenshot> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM screenshots WHERE id = ?1");
            tx.query_row(&sql, params![id.get()], row_to_screenshot)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }

    pub fn attach_to_event(&self, id: ScreenshotId, event_id: i64) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE screenshots SET event_id = ?1 WHERE id = ?2",
                params![event_id, id.get()],
            )?;
            Ok(())
        })
    }

    pub fn mark_processed(&self, id: ScreenshotId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE screenshots SET processed = 1 WHERE id = ?1",
                params![id.get()],
            )?;
            Ok(())
        })
    }

    pub fn mark_file_deleted(&self, id: ScreenshotId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE screenshots SET file_deleted = 1 WHERE id = ?1",
                params![id.get()],
            )?;
            Ok(())
        })
    }

    /// Remove the row entirely. Used only when the retention job is
    /// configured to drop rows, not just unlink files.
    pub fn delete(&self, id: ScreenshotId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute("DELETE FROM screenshots WHERE id = ?1", params![id.get()])?;
            Ok(())
        })
    }

    pub fn count(&self, exclude_deleted: bool) -> Result<u64> {
        self.store.with_tx(|tx| {
            let sql = if exclude_deleted {
                "SELECT count(*) FROM screenshots WHERE file_deleted = 0"
            } else {
                "SELECT count(*) FROM screenshots"
            };
            let n: i64 = tx.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        })
    }

    /// Oldest-first rows, for the retention job's count/age eviction.
    pub fn iter_oldest(&self, limit: u32) -> Result<Vec<Screenshot>> {
        self.store.with_tx(|tx| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM screenshots ORDER BY created_at ASC LIMIT ?1"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![limit], row_to_screenshot)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Unprocessed screenshots, newest first (C6 OCR worker batch order).
    pub fn unprocessed_newest_first(&self, limit: u32) -> Result<Vec<Screenshot>> {
        self.store.with_tx(|tx| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM screenshots WHERE processed = 0 \
                 ORDER BY created_at DESC LIMIT ?1"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![limit], row_to_screenshot)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
#[path = "screenshot_tests.rs"]
mod tests;
