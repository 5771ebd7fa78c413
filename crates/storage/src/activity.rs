// SPDX-License-Identifier: MIT

//! Activity entity and manager (C8 storage side).

use crate::error::{Result, StorageError};
use crate::event::{Event, EventId};
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

lt_core::define_row_id! {
    /// Primary key of an `activities` row.
    pub struct ActivityId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub ai_title: String,
    pub ai_summary: String,
    pub event_count: u32,
}

fn row_to_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: ActivityId::new(row.get(0)?),
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        ai_title: row.get(3)?,
        ai_summary: row.get(4)?,
        event_count: row.get::<_, i64>(5)? as u32,
    })
}

const SELECT_COLUMNS: &str = "id, start_time, end_time, ai_title, ai_summary, event_count";

pub struct ActivityManager<'a> {
    store: &'a Store,
}

impl<'a> ActivityManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Events ended at or after `since` that are not yet linked to any
    /// activity, ordered by end time (oldest first) — the aggregator's
    /// lookback query.
    pub fn get_unprocessed_events(&self, since: DateTime<Utc>) -> Result<Vec<Event>> {
        self.store.with_tx(|tx| {
            let sql = "SELECT e.id, e.app_name, e.window_title, e.start_time, e.end_time, \
                 e.ai_title, e.ai_summary FROM events e \
                 LEFT JOIN activity_events ae ON ae.event_id = e.id \
                 WHERE e.end_time IS NOT NULL AND e.end_time >= ?1 AND ae.event_id IS NULL \
                 ORDER BY e.end_time ASC";
            let mut stmt = tx.prepare(sql)?;
            let rows = stmt
                .query_map(params![since], crate::event::row_to_event_pub)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn activity_exists_for_time_window(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<bool> {
        self.store.with_tx(|tx| {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM activities WHERE start_time = ?1 AND end_time = ?2 LIMIT 1",
                    params![window_start, window_end],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(exists.is_some())
        })
    }

    pub fn activity_exists_for_event(&self, event_id: EventId) -> Result<bool> {
        self.store.with_tx(|tx| {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM activity_events WHERE event_id = ?1 LIMIT 1",
                    params![event_id.get()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(exists.is_some())
        })
    }

    /// Whether any activity's `[start,end)` window overlaps the given
    /// event's `[start,end)` span — used by the long-event carve-out path.
    pub fn activity_overlaps_with_event(&self, event: &Event) -> Result<bool> {
        let Some(event_end) = event.end_time else {
            return Ok(false);
        };
        self.store.with_tx(|tx| {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM activities WHERE start_time < ?1 AND end_time > ?2 LIMIT 1",
                    params![event_end, event.start_time],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(exists.is_some())
        })
    }

    /// Create an activity covering `[start,end)` linked to `event_ids`.
    /// Callers must check `activity_exists_for_time_window`/`_for_event`
    /// inside the same transaction scope beforehand; uniqueness on
    /// `activity_events.event_id` additionally guards against double-link.
    pub fn create(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        ai_title: &str,
        ai_summary: &str,
        event_ids: &[EventId],
    ) -> Result<ActivityId> {
        if event_ids.is_empty() {
            return Err(StorageError::InvalidData(
                "activity must link at least one event".into(),
            ));
        }
        self.store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO activities (start_time, end_time, ai_title, ai_summary, event_count) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![start_time, end_time, ai_title, ai_summary, event_ids.len() as i64],
            )?;
            let activity_id = ActivityId::new(tx.last_insert_rowid());
            for event_id in event_ids {
                tx.execute(
                    "INSERT INTO activity_events (activity_id, event_id) VALUES (?1, ?2)",
                    params![activity_id.get(), event_id.get()],
                )?;
            }
            Ok(activity_id)
        })
    }

    pub fn get_activity_events(&self, activity_id: ActivityId) -> Result<Vec<EventId>> {
        self.store.with_tx(|tx| {
            let mut stmt =
                tx.prepare("SELECT event_id FROM activity_events WHERE activity_id = ?1")?;
            let rows = stmt
                .query_map(params![activity_id.get()], |row| {
                    Ok(EventId::new(row.get(0)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn get_by_id(&self, id: ActivityId) -> Result<Activity> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM activities WHERE id = ?1");
            tx.query_row(&sql, params![id.get()], row_to_activity)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
