// SPDX-License-Identifier: MIT

//! Activity aggregation tick (C8), grounded on the original
//! `activity_aggregator.py`'s cold-window batching: each tick processes
//! exactly the one 15-minute window that just turned cold, never more —
//! a process that missed several windows does not backfill them.

use crate::error::AggregatorError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use lt_adapters::{ActivityEventView, SummaryOracle};
use lt_core::time::round_down_15m;
use lt_core::Clock;
use lt_storage::{Activity, ActivityManager, Event, Store};
use std::sync::Arc;

/// Events lasting at least this long are aggregated individually rather
/// than bucketed with their neighbors.
const LONG_EVENT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Extra margin past a window's end before it is treated as cold —
    /// guards against a screenshot landing in the window after the tick
    /// that would otherwise have just closed it.
    pub safety_gap: ChronoDuration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { safety_gap: ChronoDuration::minutes(1) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorTickSummary {
    pub activities_created: u32,
    pub events_considered: u32,
}

pub struct AggregatorJob {
    store: Arc<Store>,
    summary_oracle: Arc<dyn SummaryOracle>,
    clock: Arc<dyn Clock>,
    config: AggregatorConfig,
}

impl AggregatorJob {
    pub fn new(
        store: Arc<Store>,
        summary_oracle: Arc<dyn SummaryOracle>,
        clock: Arc<dyn Clock>,
        config: AggregatorConfig,
    ) -> Self {
        Self { store, summary_oracle, clock, config }
    }

    /// Process exactly one target window per tick — `[round15(now) - 15m,
    /// round15(now))` — never more. A process that was down across
    /// several windows does not backfill them; it only ever catches the
    /// window that is cold as of this call.
    pub async fn tick(&self) -> Result<AggregatorTickSummary, AggregatorError> {
        let now = self.clock.now_utc();
        let window_end = round_down_15m(now);
        let window_start = window_end - ChronoDuration::minutes(15);

        let summary = AggregatorTickSummary::default();
        if now < window_end + self.config.safety_gap {
            return Ok(summary); // window not cold yet
        }

        let activities = ActivityManager::new(&self.store);
        let events: Vec<Event> = activities
            .get_unprocessed_events(window_start)?
            .into_iter()
            .filter(|e| e.end_time.map(|end| end < window_end).unwrap_or(false))
            .collect();

        let mut summary = AggregatorTickSummary { events_considered: events.len() as u32, ..summary };
        if events.is_empty() {
            return Ok(summary);
        }

        let (long_events, short_events): (Vec<_>, Vec<_>) = events
            .into_iter()
            .partition(|e| event_duration_minutes(e) >= LONG_EVENT_DURATION_MINUTES);

        for event in long_events {
            if self.process_long_event(&activities, &event).await? {
                summary.activities_created += 1;
            }
        }

        summary.activities_created +=
            self.process_short_events(&activities, window_start, window_end, short_events).await?;

        Ok(summary)
    }

    async fn process_long_event(
        &self,
        activities: &ActivityManager<'_>,
        event: &Event,
    ) -> Result<bool, AggregatorError> {
        if activities.activity_exists_for_event(event.id)? {
            return Ok(false);
        }
        let Some(end) = event.end_time else { return Ok(false) };
        if activities.activity_exists_for_time_window(event.start_time, end)? {
            return Ok(false);
        }

        let view = vec![event_view(event)];
        let result = self.summary_oracle.summarize_activity(&view, event.start_time, end).await;
        let (title, body) = resolve_summary(result, &view);

        activities.create(event.start_time, end, &title, &body, &[event.id])?;
        Ok(true)
    }

    /// Every short event remaining after the long-event pass belongs to the
    /// single target window passed in; they are linked into one activity
    /// covering the whole window, not bucketed further.
    async fn process_short_events(
        &self,
        activities: &ActivityManager<'_>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        events: Vec<Event>,
    ) -> Result<u32, AggregatorError> {
        if events.is_empty() {
            return Ok(0);
        }
        if activities.activity_exists_for_time_window(window_start, window_end)? {
            return Ok(0);
        }

        let event_ids: Vec<_> = events.iter().map(|e| e.id).collect();
        let views: Vec<_> = events.iter().map(event_view).collect();

        let result = self
            .summary_oracle
            .summarize_activity(&views, window_start, window_end)
            .await;
        let (title, body) = resolve_summary(result, &views);

        activities.create(window_start, window_end, &title, &body, &event_ids)?;
        Ok(1)
    }
}

fn event_duration_minutes(event: &Event) -> i64 {
    match event.end_time {
        Some(end) => (end - event.start_time).num_minutes(),
        None => 0,
    }
}

fn event_view(event: &Event) -> ActivityEventView {
    ActivityEventView {
        app_name: event.app_name.clone(),
        window_title: event.window_title.clone(),
        ai_title: event.ai_title.clone(),
    }
}

/// The oracle declining (`Ok(None)`) or failing (`Err`) never drops a
/// window silently — both fall back to a deterministic summary built from
/// the event titles.
fn resolve_summary(
    result: Result<Option<lt_adapters::ActivitySummary>, lt_adapters::SummaryError>,
    views: &[ActivityEventView],
) -> (String, String) {
    match result {
        Ok(Some(summary)) => (summary.title, summary.summary),
        Ok(None) => (fallback_title(views), fallback_body(views)),
        Err(e) => {
            tracing::warn!(error = %e, "activity summarizer unavailable, using fallback summary");
            (fallback_title(views), fallback_body(views))
        }
    }
}

fn fallback_title(views: &[ActivityEventView]) -> String {
    views
        .first()
        .map(|v| v.ai_title.clone().unwrap_or_else(|| v.app_name.clone()))
        .unwrap_or_else(|| "Activity".to_string())
}

fn fallback_body(views: &[ActivityEventView]) -> String {
    views
        .iter()
        .map(|v| match &v.ai_title {
            Some(title) => title.clone(),
            None => format!("{} — {}", v.app_name, v.window_title),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
