// SPDX-License-Identifier: MIT

//! Reminder planner (C10), grounded directly on
//! `original_source/lifetrace/jobs/deadline_reminder.py`.

use crate::error::{JobError, ReminderError};
use crate::scheduler::{JobContext, Scheduler};
use lt_core::Clock;
use lt_storage::{
    NewNotification, NotificationManager, Todo, TodoId, TodoManager, TodoStatus,
};
use lt_storage::Store;
use std::sync::Arc;
use std::time::Duration;

const JOB_FUNCTION_NAME: &str = "execute_todo_reminder_job";
const MISFIRE_GRACE: Duration = Duration::from_secs(300);
/// Tolerance for clock drift between when a reminder was scheduled and
/// when its `execute_todo_reminder_job` fire actually runs.
const DRIFT_TOLERANCE_SECS: i64 = 1;

fn job_id(todo_id: TodoId, offset_minutes: u32) -> String {
    format!("todo_reminder_{}_{}", todo_id.get(), offset_minutes)
}

fn job_id_prefix(todo_id: TodoId) -> String {
    format!("todo_reminder_{}_", todo_id.get())
}

pub struct ReminderPlanner {
    store: Arc<Store>,
    scheduler: Arc<Scheduler>,
    clock: Arc<dyn Clock>,
}

impl ReminderPlanner {
    pub fn new(store: Arc<Store>, scheduler: Arc<Scheduler>, clock: Arc<dyn Clock>) -> Self {
        Self { store, scheduler, clock }
    }

    /// Register the fire function with the scheduler. Must run once before
    /// any reminder job can actually execute.
    pub fn install(&self) {
        let store = self.store.clone();
        let clock = self.clock.clone();
        self.scheduler.register_function(
            JOB_FUNCTION_NAME,
            Arc::new(move |ctx: JobContext| {
                let store = store.clone();
                let clock = clock.clone();
                Box::pin(async move { execute_todo_reminder_job(&store, clock.as_ref(), ctx).await })
            }),
        );
    }

    /// Schedule one date job per reminder offset. A `reminder_at` that has
    /// already passed by more than [`MISFIRE_GRACE`] is dropped as stale; one
    /// that passed within the grace window is a catch-up and fires at `now`
    /// instead of being skipped; everything else fires at its own
    /// `reminder_at`.
    pub fn schedule_todo_reminders(&self, todo: &Todo) -> Result<(), ReminderError> {
        let Some(instant) = todo.schedulable_instant() else {
            return Ok(());
        };
        let now = self.clock.now_utc();
        let grace = chrono::Duration::from_std(MISFIRE_GRACE).unwrap_or_default();

        for &offset_minutes in &todo.reminder_offsets {
            let reminder_at = instant - chrono::Duration::minutes(offset_minutes as i64);
            let fire_at = if reminder_at <= now - grace {
                continue;
            } else if reminder_at <= now {
                now
            } else {
                reminder_at
            };

            let kwargs = serde_json::json!({
                "todo_id": todo.id.get(),
                "offset_minutes": offset_minutes,
            });
            self.scheduler.add_date_job(
                &job_id(todo.id, offset_minutes),
                &format!("remind:{}", todo.name),
                fire_at,
                JOB_FUNCTION_NAME,
                kwargs,
                MISFIRE_GRACE,
            )?;
        }
        Ok(())
    }

    /// Remove every previously scheduled reminder job for a todo (prefix
    /// scan over `todo_reminder_<id>_`).
    pub fn remove_todo_reminder_jobs(&self, todo_id: TodoId) -> Result<(), ReminderError> {
        let prefix = job_id_prefix(todo_id);
        for job in self.scheduler.get_all_jobs()? {
            if job.id.starts_with(&prefix) {
                self.scheduler.remove_job(&job.id)?;
            }
        }
        Ok(())
    }

    /// Remove then reschedule — the only supported path for a todo whose
    /// due/deadline/reminder offsets changed.
    pub fn refresh_todo_reminders(&self, todo: &Todo) -> Result<(), ReminderError> {
        self.remove_todo_reminder_jobs(todo.id)?;
        self.schedule_todo_reminders(todo)
    }

    /// Startup reconciliation: refresh reminders for every active todo
    /// that carries a schedulable instant. Callers gate this on
    /// `jobs.deadline_reminder.enabled`.
    pub fn sync_all(&self) -> Result<(), ReminderError> {
        let todos = TodoManager::new(&self.store).get_active_todos_for_prompt()?;
        for todo in todos {
            self.refresh_todo_reminders(&todo)?;
        }
        Ok(())
    }
}

/// The scheduler fire function: re-reads the todo, re-verifies it is still
/// active, recomputes the expected reminder time within a 1-second drift
/// tolerance, and is a no-op if a dismissed notification already exists
/// for this exact reminder instant.
async fn execute_todo_reminder_job(
    store: &Store,
    clock: &dyn Clock,
    ctx: JobContext,
) -> Result<(), JobError> {
    let todo_id = ctx
        .kwargs
        .get("todo_id")
        .and_then(|v| v.as_i64())
        .map(TodoId::new)
        .ok_or(JobError::Reminder(ReminderError::Storage(
            lt_storage::StorageError::InvalidData("missing todo_id in job kwargs".into()),
        )))?;
    let offset_minutes = ctx.kwargs.get("offset_minutes").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

    let todo_mgr = TodoManager::new(store);
    let todo = match todo_mgr.get(todo_id) {
        Ok(todo) => todo,
        Err(lt_storage::StorageError::NotFound) => return Ok(()),
        Err(e) => return Err(JobError::Storage(e)),
    };
    if todo.status != TodoStatus::Active {
        return Ok(());
    }

    let Some(instant) = todo.schedulable_instant() else {
        return Ok(());
    };
    let expected_reminder_at = instant - chrono::Duration::minutes(offset_minutes as i64);
    let now = clock.now_utc();
    // A normal fire lands within a second of expected_reminder_at; a
    // catch-up fire (scheduled at `now` when reminder_at had already
    // passed within the misfire grace) lands up to MISFIRE_GRACE later.
    // Either is legitimate; anything outside that window means the todo's
    // schedule changed since this job was queued.
    let drift = ctx.fire_time - expected_reminder_at;
    let early_tolerance = chrono::Duration::seconds(DRIFT_TOLERANCE_SECS);
    let late_tolerance = chrono::Duration::from_std(MISFIRE_GRACE).unwrap_or_default();
    if drift < -early_tolerance || drift > late_tolerance {
        tracing::warn!(
            todo_id = todo_id.get(),
            "reminder fire time drifted from the todo's current schedule, skipping"
        );
        return Ok(());
    }

    let reminder_at = expected_reminder_at;
    let notification_mgr = NotificationManager::new(store);
    let candidate_id = lt_storage::NotificationId::for_reminder(todo_id, reminder_at);
    if notification_mgr.is_dismissed(&candidate_id)? {
        return Ok(());
    }

    notification_mgr.add(NewNotification {
        todo_id,
        title: todo.name.clone(),
        content: todo.description.clone(),
        created_at: now,
        schedule_time: instant,
        reminder_at,
        reminder_offset_minutes: offset_minutes as i64,
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "reminder_tests.rs"]
mod tests;
