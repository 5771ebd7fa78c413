// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Storage failure taxonomy.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("row not found")]
    NotFound,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
