// SPDX-License-Identifier: MIT

//! Event entity and manager (C7).
//!
//! Exactly one event may have `end_time IS NULL` ("active") at any instant.
//! `get_or_create_event` and `close_active_event` both run inside a single
//! transaction so that invariant holds even under concurrent callers.

use crate::error::{Result, StorageError};
use crate::screenshot::{row_to_screenshot, Screenshot, SELECT_COLUMNS as SCREENSHOT_COLUMNS};
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

lt_core::define_row_id! {
    /// Primary key of an `events` row.
    pub struct EventId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub app_name: String,
    pub window_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub ai_title: Option<String>,
    pub ai_summary: Option<String>,
}

impl Event {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: EventId::new(row.get(0)?),
        app_name: row.get(1)?,
        window_title: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        ai_title: row.get(5)?,
        ai_summary: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, app_name, window_title, start_time, end_time, ai_title, ai_summary";

pub struct EventManager<'a> {
    store: &'a Store,
}

impl<'a> EventManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Refresh the active event if `(app, title)` matches, otherwise close
    /// it and open a new one.
    pub fn get_or_create_event(
        &self,
        app_name: &str,
        window_title: &str,
        now: DateTime<Utc>,
    ) -> Result<EventId> {
        self.store.with_tx(|tx| {
            let active = tx
                .query_row(
                    "SELECT id, app_name, window_title FROM events WHERE end_time IS NULL",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;

            if let Some((id, active_app, active_title)) = active {
                if active_app == app_name && active_title == window_title {
                    tx.execute(
                        "UPDATE events SET end_time = ?1 WHERE id = ?2",
                        params![now, id],
                    )?;
                    return Ok(EventId::new(id));
                }
                tx.execute(
                    "UPDATE events SET end_time = ?1 WHERE id = ?2",
                    params![now, id],
                )?;
            }

            tx.execute(
                "INSERT INTO events (app_name, window_title, start_time, end_time) \
                 VALUES (?1, ?2, ?3, NULL)",
                params![app_name, window_title, now],
            )?;
            Ok(EventId::new(tx.last_insert_rowid()))
        })
    }

    /// Close whatever event is active, if any. Idempotent.
    pub fn close_active_event(&self, now: DateTime<Utc>) -> Result<Option<EventId>> {
        self.store.with_tx(|tx| {
            let active_id = tx
                .query_row(
                    "SELECT id FROM events WHERE end_time IS NULL",
                    [],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            if let Some(id) = active_id {
                tx.execute(
                    "UPDATE events SET end_time = ?1 WHERE id = ?2",
                    params![now, id],
                )?;
                return Ok(Some(EventId::new(id)));
            }
            Ok(None)
        })
    }

    pub fn get_by_id(&self, id: EventId) -> Result<Event> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM events WHERE id = ?1");
            tx.query_row(&sql, params![id.get()], row_to_event)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }

    pub fn set_summary(&self, id: EventId, title: &str, summary: &str) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE events SET ai_title = ?1, ai_summary = ?2 WHERE id = ?3",
                params![title, summary, id.get()],
            )?;
            Ok(())
        })
    }

    /// Every screenshot attached to this event (`ScreenshotManager::attach_to_event`),
    /// oldest first.
    pub fn get_screenshots(&self, id: EventId) -> Result<Vec<Screenshot>> {
        self.store.with_tx(|tx| {
            let sql = format!(
                "SELECT {SCREENSHOT_COLUMNS} FROM screenshots WHERE event_id = ?1 ORDER BY created_at ASC"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![id.get()], row_to_screenshot)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

pub(crate) fn row_to_event_pub(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    row_to_event(row)
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
