// SPDX-License-Identifier: MIT

//! Activity summarization oracle (C8 collaborator).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("oracle unavailable")]
    Unavailable,
    #[error("summarization failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEventView {
    pub app_name: String,
    pub window_title: String,
    pub ai_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub title: String,
    pub summary: String,
}

#[async_trait]
pub trait SummaryOracle: Send + Sync + 'static {
    /// `None` (not `Err`) means "declined to summarize" — the aggregator
    /// falls back to a deterministic summary rather than dropping the
    /// window, per the strengthened fallback behavior.
    async fn summarize_activity(
        &self,
        events: &[ActivityEventView],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<ActivitySummary>, SummaryError>;
}

/// Oracle used when no LLM backend is configured. Always declines, which
/// `AggregatorJob` treats as "use the deterministic fallback summary."
#[derive(Debug, Default)]
pub struct NullSummaryOracle;

#[async_trait]
impl SummaryOracle for NullSummaryOracle {
    async fn summarize_activity(
        &self,
        _events: &[ActivityEventView],
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Option<ActivitySummary>, SummaryError> {
        Ok(None)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;

    /// Fake oracle: returns a fixed summary, declines (`Ok(None)`), or
    /// fails, depending on construction.
    pub enum FakeSummaryOracle {
        Returns(ActivitySummary),
        Declines,
        Fails,
    }

    #[async_trait]
    impl SummaryOracle for FakeSummaryOracle {
        async fn summarize_activity(
            &self,
            _events: &[ActivityEventView],
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Option<ActivitySummary>, SummaryError> {
            match self {
                FakeSummaryOracle::Returns(summary) => Ok(Some(summary.clone())),
                FakeSummaryOracle::Declines => Ok(None),
                FakeSummaryOracle::Fails => Err(SummaryError::Unavailable),
            }
        }
    }
}
