// SPDX-License-Identifier: MIT

//! OCRResult entity and manager (C3 `ocr_mgr`).

use crate::error::Result;
use crate::screenshot::ScreenshotId;
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

lt_core::define_row_id! {
    /// Primary key of an `ocr_results` row.
    pub struct OcrResultId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    pub id: OcrResultId,
    pub screenshot_id: ScreenshotId,
    pub text_content: String,
    pub text_hash: Option<String>,
    pub confidence: f32,
    pub language: String,
    pub processing_time_ms: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewOcrResult {
    pub screenshot_id: ScreenshotId,
    pub text_content: String,
    pub text_hash: Option<String>,
    pub confidence: f32,
    pub language: String,
    pub processing_time_ms: i64,
    pub created_at: DateTime<Utc>,
}

fn row_to_ocr(row: &rusqlite::Row<'_>) -> rusqlite::Result<OcrResult> {
    Ok(OcrResult {
        id: OcrResultId::new(row.get(0)?),
        screenshot_id: ScreenshotId::new(row.get(1)?),
        text_content: row.get(2)?,
        text_hash: row.get(3)?,
        confidence: row.get(4)?,
        language: row.get(5)?,
        processing_time_ms: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const SELECT_COLUMNS: &str = "id, screenshot_id, text_content, text_hash, confidence, language, \
     processing_time_ms, created_at";

pub struct OcrManager<'a> {
    store: &'a Store,
}

impl<'a> OcrManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert an OCR result and mark its screenshot processed, in one
    /// transaction. A duplicate `screenshot_id` is idempotent success.
    pub fn add(&self, new: NewOcrResult) -> Result<OcrResultId> {
        self.store.with_tx(|tx| {
            if let Some(existing) = tx
                .query_row(
                    "SELECT id FROM ocr_results WHERE screenshot_id = ?1",
                    params![new.screenshot_id.get()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?
            {
                return Ok(OcrResultId::new(existing));
            }

            tx.execute(
                "INSERT INTO ocr_results (screenshot_id, text_content, text_hash, confidence, \
                 language, processing_time_ms, created_at) VALUES (?1,?2,?3,?4,?5,?6,?7)",
                params![
                    new.screenshot_id.get(),
                    new.text_content,
                    new.text_hash,
                    new.confidence,
                    new.language,
                    new.processing_time_ms,
                    new.created_at,
                ],
            )?;
            tx.execute(
                "UPDATE screenshots SET processed = 1 WHERE id = ?1",
                params![new.screenshot_id.get()],
            )?;
            Ok(OcrResultId::new(tx.last_insert_rowid()))
        })
    }

    pub fn get_by_screenshot(&self, screenshot_id: ScreenshotId) -> Result<Option<OcrResult>> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM ocr_results WHERE screenshot_id = ?1");
            tx.query_row(&sql, params![screenshot_id.get()], row_to_ocr)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn get_by_text_hash(&self, text_hash: &str) -> Result<Vec<OcrResult>> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM ocr_results WHERE text_hash = ?1");
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![text_hash], row_to_ocr)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
#[path = "ocr_tests.rs"]
mod tests;
