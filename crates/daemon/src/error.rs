// SPDX-License-Identifier: MIT

//! Error taxonomy for the composition root: config loading/reload and
//! the one-shot startup sequence that assembles every worker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config key not found: {0}")]
    MissingKey(String),
    #[error("config value at {path} is not a {expected}")]
    WrongType { path: String, expected: &'static str },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] lt_storage::StorageError),
    #[error(transparent)]
    JobManager(#[from] lt_engine::JobManagerError),
    #[error("no home directory could be resolved; set LIFETRACE_DATA_DIR")]
    NoDataDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
