// SPDX-License-Identifier: MIT

//! Notification entity and manager (C3 `notification_mgr`). Notification
//! ids are deterministic, not generated: `todo_{todo_id}_reminder_{unix
//! (reminder_at)}`, so scheduling the same reminder twice collides onto the
//! same row instead of producing a duplicate.

use crate::error::Result;
use crate::store::Store;
use crate::todo::TodoId;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn for_reminder(todo_id: TodoId, reminder_at: DateTime<Utc>) -> Self {
        Self(format!(
            "todo_{}_reminder_{}",
            todo_id.get(),
            reminder_at.timestamp()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub todo_id: TodoId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub schedule_time: DateTime<Utc>,
    pub reminder_at: DateTime<Utc>,
    pub reminder_offset_minutes: i64,
    pub dismissed: bool,
}

pub struct NewNotification {
    pub todo_id: TodoId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub schedule_time: DateTime<Utc>,
    pub reminder_at: DateTime<Utc>,
    pub reminder_offset_minutes: i64,
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: NotificationId(row.get(0)?),
        todo_id: TodoId::new(row.get(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        schedule_time: row.get(5)?,
        reminder_at: row.get(6)?,
        reminder_offset_minutes: row.get(7)?,
        dismissed: row.get::<_, i64>(8)? != 0,
    })
}

const SELECT_COLUMNS: &str = "id, todo_id, title, content, created_at, schedule_time, \
     reminder_at, reminder_offset_minutes, dismissed";

pub struct NotificationManager<'a> {
    store: &'a Store,
}

impl<'a> NotificationManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a notification. Reusing an existing id (same todo + same
    /// reminder instant) is idempotent and leaves the row untouched.
    pub fn add(&self, new: NewNotification) -> Result<NotificationId> {
        let id = NotificationId::for_reminder(new.todo_id, new.reminder_at);
        self.store.with_tx(|tx| {
            tx.execute(
                "INSERT OR IGNORE INTO notifications (id, todo_id, title, content, created_at, \
                 schedule_time, reminder_at, reminder_offset_minutes, dismissed) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,0)",
                params![
                    id.as_str(),
                    new.todo_id.get(),
                    new.title,
                    new.content,
                    new.created_at,
                    new.schedule_time,
                    new.reminder_at,
                    new.reminder_offset_minutes,
                ],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    pub fn is_dismissed(&self, id: &NotificationId) -> Result<bool> {
        self.store.with_tx(|tx| {
            let dismissed: Option<i64> = tx
                .query_row(
                    "SELECT dismissed FROM notifications WHERE id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(dismissed.unwrap_or(0) != 0)
        })
    }

    pub fn dismiss(&self, id: &NotificationId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE notifications SET dismissed = 1 WHERE id = ?1",
                params![id.as_str()],
            )?;
            Ok(())
        })
    }

    pub fn list_for_todo(&self, todo_id: TodoId) -> Result<Vec<Notification>> {
        self.store.with_tx(|tx| {
            let sql =
                format!("SELECT {SELECT_COLUMNS} FROM notifications WHERE todo_id = ?1 ORDER BY reminder_at ASC");
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![todo_id.get()], row_to_notification)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Drop every notification row for a todo. Used when a todo's schedule
    /// changes and its previously planned reminders must be re-derived.
    pub fn remove_for_todo(&self, todo_id: TodoId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "DELETE FROM notifications WHERE todo_id = ?1",
                params![todo_id.get()],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
