// SPDX-License-Identifier: MIT

//! `Store` owns the single SQLite connection and bounds every manager
//! method to one transaction. This is a single-process, single-writer
//! daemon, so a plain `Mutex<Connection>` serializes writers without
//! needing a connection pool.

use crate::error::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if absent) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(crate::schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(crate::schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` inside a transaction, committing on `Ok` and rolling back on
    /// `Err` (rusqlite's `Transaction::drop` rolls back automatically if we
    /// never call `commit`).
    pub(crate) fn with_tx<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
