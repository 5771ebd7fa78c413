// SPDX-License-Identifier: MIT

//! Todo entity and manager (C3 `todo_mgr`).

use crate::error::{Result, StorageError};
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

lt_core::define_row_id! {
    /// Primary key of a `todos` row.
    pub struct TodoId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    Draft,
    Active,
    Done,
    Archived,
}

impl TodoStatus {
    fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Draft => "draft",
            TodoStatus::Active => "active",
            TodoStatus::Done => "done",
            TodoStatus::Archived => "archived",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "draft" => TodoStatus::Draft,
            "active" => TodoStatus::Active,
            "done" => TodoStatus::Done,
            "archived" => TodoStatus::Archived,
            other => return Err(StorageError::InvalidData(format!("bad todo status: {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    VTodo,
    VEvent,
}

impl ItemType {
    fn as_str(self) -> &'static str {
        match self {
            ItemType::VTodo => "VTODO",
            ItemType::VEvent => "VEVENT",
        }
    }

    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("VEVENT") {
            ItemType::VEvent
        } else {
            ItemType::VTodo
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    pub description: String,
    pub status: TodoStatus,
    pub due: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub dtstart: Option<DateTime<Utc>>,
    pub item_type: ItemType,
    /// Ordered, nonnegative minute offsets before the schedulable instant.
    pub reminder_offsets: Vec<u32>,
    pub user_notes: String,
    pub priority: i32,
    pub tags: Vec<String>,
}

impl Todo {
    /// The schedulable instant: for
    /// VEVENT, `dtstart`/`start_time` take priority; for VTODO, `due`/
    /// `deadline` take priority. Falls back through the remaining fields.
    pub fn schedulable_instant(&self) -> Option<DateTime<Utc>> {
        match self.item_type {
            ItemType::VEvent => self
                .dtstart
                .or(self.start_time)
                .or(self.due)
                .or(self.deadline),
            ItemType::VTodo => self
                .due
                .or(self.deadline)
                .or(self.dtstart)
                .or(self.start_time),
        }
    }
}

pub struct NewTodo {
    pub name: String,
    pub description: String,
    pub status: TodoStatus,
    pub due: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub dtstart: Option<DateTime<Utc>>,
    pub item_type: ItemType,
    pub reminder_offsets: Vec<u32>,
    pub user_notes: String,
    pub priority: i32,
    pub tags: Vec<String>,
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    let status_str: String = row.get(3)?;
    let item_type_str: String = row.get(8)?;
    let offsets_json: String = row.get(9)?;
    let tags_json: String = row.get(12)?;
    Ok(Todo {
        id: TodoId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        status: TodoStatus::parse(&status_str).unwrap_or(TodoStatus::Draft),
        due: row.get(4)?,
        start_time: row.get(5)?,
        deadline: row.get(6)?,
        dtstart: row.get(7)?,
        item_type: ItemType::parse(&item_type_str),
        reminder_offsets: serde_json::from_str(&offsets_json).unwrap_or_default(),
        user_notes: row.get(10)?,
        priority: row.get(11)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
    })
}

const SELECT_COLUMNS: &str = "id, name, description, status, due, start_time, deadline, \
     dtstart, item_type, reminder_offsets, user_notes, priority, tags";

pub struct TodoManager<'a> {
    store: &'a Store,
}

impl<'a> TodoManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn create(&self, new: NewTodo) -> Result<TodoId> {
        self.store.with_tx(|tx| {
            let offsets = serde_json::to_string(&new.reminder_offsets)
                .map_err(|e| StorageError::InvalidData(e.to_string()))?;
            let tags = serde_json::to_string(&new.tags)
                .map_err(|e| StorageError::InvalidData(e.to_string()))?;
            tx.execute(
                "INSERT INTO todos (name, description, status, due, start_time, deadline, \
                 dtstart, item_type, reminder_offsets, user_notes, priority, tags) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
                params![
                    new.name,
                    new.description,
                    new.status.as_str(),
                    new.due,
                    new.start_time,
                    new.deadline,
                    new.dtstart,
                    new.item_type.as_str(),
                    offsets,
                    new.user_notes,
                    new.priority,
                    tags,
                ],
            )?;
            Ok(TodoId::new(tx.last_insert_rowid()))
        })
    }

    pub fn get(&self, id: TodoId) -> Result<Todo> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM todos WHERE id = ?1");
            tx.query_row(&sql, params![id.get()], row_to_todo)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }

    pub fn update_status(&self, id: TodoId, status: TodoStatus) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE todos SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id.get()],
            )?;
            Ok(())
        })
    }

    pub fn delete(&self, id: TodoId) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute("DELETE FROM todos WHERE id = ?1", params![id.get()])?;
            Ok(())
        })
    }

    pub fn list(&self, status: Option<TodoStatus>, limit: u32) -> Result<Vec<Todo>> {
        self.store.with_tx(|tx| {
            let rows = match status {
                Some(status) => {
                    let sql = format!(
                        "SELECT {SELECT_COLUMNS} FROM todos WHERE status = ?1 LIMIT ?2"
                    );
                    let mut stmt = tx.prepare(&sql)?;
                    stmt.query_map(params![status.as_str(), limit], row_to_todo)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let sql = format!("SELECT {SELECT_COLUMNS} FROM todos LIMIT ?1");
                    let mut stmt = tx.prepare(&sql)?;
                    stmt.query_map(params![limit], row_to_todo)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(rows)
        })
    }

    /// Active todos carrying any schedulable time, for context assembly
    /// (the "prompt" collaborator — an external LLM oracle this crate never
    /// calls directly).
    pub fn get_active_todos_for_prompt(&self) -> Result<Vec<Todo>> {
        let todos = self.list(Some(TodoStatus::Active), u32::MAX)?;
        Ok(todos
            .into_iter()
            .filter(|t| t.schedulable_instant().is_some())
            .collect())
    }
}

#[cfg(test)]
#[path = "todo_tests.rs"]
mod tests;
