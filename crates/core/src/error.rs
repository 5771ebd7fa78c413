// SPDX-License-Identifier: MIT

//! Shared error kinds, per the error taxonomy: transient I/O, data-shape,
//! programmer error, and external-oracle unavailability all propagate
//! through crate-specific `thiserror` enums, but callers that just need to
//! classify a failure (e.g. to decide whether to retry) can match on
//! [`ErrorKind`].

use thiserror::Error;

/// Coarse classification used by callers deciding retry/log policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Disk full, permission flicker, OS probe timeout: retry next tick.
    TransientIo,
    /// Malformed config, missing key, invalid todo time: surface to caller.
    DataShape,
    /// Broken function reference, invariant violation.
    Programmer,
    /// LLM/embedding/vision oracle unavailable: degrade gracefully.
    ExternalOracle,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing config key: {0}")]
    MissingKey(String),
    #[error("{0}")]
    Other(String),
}
