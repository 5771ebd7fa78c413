// SPDX-License-Identifier: MIT

//! Durable job store backing the scheduler (C9 `JobStore`). Kept in the
//! same database file as the rest of storage instead of a separate
//! `scheduler.db`, avoiding a second connection/lock domain in the
//! original design.

use crate::error::{Result, StorageError};
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Interval,
    Date,
}

impl TriggerKind {
    fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Interval => "interval",
            TriggerKind::Date => "date",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "interval" => TriggerKind::Interval,
            "date" => TriggerKind::Date,
            other => return Err(StorageError::InvalidData(format!("bad trigger kind: {other}"))),
        })
    }
}

/// A persisted scheduler job row. `trigger_spec` and `kwargs` are opaque
/// JSON blobs the engine crate owns the shape of; storage never interprets
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJobRecord {
    pub id: String,
    pub name: String,
    pub trigger_kind: TriggerKind,
    pub trigger_spec: String,
    pub next_run_time: Option<DateTime<Utc>>,
    pub kwargs: String,
    pub misfire_grace_time_secs: i64,
    pub paused: bool,
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduledJobRecord> {
    let trigger_kind_str: String = row.get(2)?;
    Ok(ScheduledJobRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        trigger_kind: TriggerKind::parse(&trigger_kind_str).unwrap_or(TriggerKind::Interval),
        trigger_spec: row.get(3)?,
        next_run_time: row.get(4)?,
        kwargs: row.get(5)?,
        misfire_grace_time_secs: row.get(6)?,
        paused: row.get::<_, i64>(7)? != 0,
    })
}

const SELECT_COLUMNS: &str =
    "id, name, trigger_kind, trigger_spec, next_run_time, kwargs, misfire_grace_time_secs, paused";

pub struct SchedulerJobStore<'a> {
    store: &'a Store,
}

impl<'a> SchedulerJobStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert or fully replace a job row by id.
    pub fn upsert(&self, job: &ScheduledJobRecord) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO scheduler_jobs (id, name, trigger_kind, trigger_spec, \
                 next_run_time, kwargs, misfire_grace_time_secs, paused) VALUES (?1,?2,?3,?4,?5,?6,?7,?8) \
                 ON CONFLICT(id) DO UPDATE SET name=excluded.name, \
                 trigger_kind=excluded.trigger_kind, trigger_spec=excluded.trigger_spec, \
                 next_run_time=excluded.next_run_time, kwargs=excluded.kwargs, \
                 misfire_grace_time_secs=excluded.misfire_grace_time_secs, paused=excluded.paused",
                params![
                    job.id,
                    job.name,
                    job.trigger_kind.as_str(),
                    job.trigger_spec,
                    job.next_run_time,
                    job.kwargs,
                    job.misfire_grace_time_secs,
                    job.paused as i64,
                ],
            )?;
            Ok(())
        })
    }

    /// Flip `paused` in place without touching any other column.
    pub fn set_paused(&self, id: &str, paused: bool) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE scheduler_jobs SET paused = ?1 WHERE id = ?2",
                params![paused as i64, id],
            )?;
            Ok(())
        })
    }

    pub fn get(&self, id: &str) -> Result<ScheduledJobRecord> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM scheduler_jobs WHERE id = ?1");
            tx.query_row(&sql, params![id], row_to_job)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute("DELETE FROM scheduler_jobs WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    pub fn set_next_run_time(&self, id: &str, next: Option<DateTime<Utc>>) -> Result<()> {
        self.store.with_tx(|tx| {
            tx.execute(
                "UPDATE scheduler_jobs SET next_run_time = ?1 WHERE id = ?2",
                params![next, id],
            )?;
            Ok(())
        })
    }

    pub fn list_all(&self) -> Result<Vec<ScheduledJobRecord>> {
        self.store.with_tx(|tx| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM scheduler_jobs");
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map([], row_to_job)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Jobs whose `next_run_time` has arrived, oldest due first.
    pub fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJobRecord>> {
        self.store.with_tx(|tx| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM scheduler_jobs \
                 WHERE next_run_time IS NOT NULL AND next_run_time <= ?1 \
                 ORDER BY next_run_time ASC"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params![now], row_to_job)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
#[path = "scheduler_jobs_tests.rs"]
mod tests;
