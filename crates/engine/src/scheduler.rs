// SPDX-License-Identifier: MIT

//! Background job scheduler (C9). Interval and one-shot triggers, a
//! durable job store, a bounded worker pool, and `max_instances=1`
//! enforced per job id.

use crate::error::{JobError, SchedulerError};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use lt_core::Clock;
use lt_storage::{ScheduledJobRecord, Store, TriggerKind};
use parking_lot::Mutex as SyncMutex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex as AsyncMutex, Semaphore};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Interval(Duration),
    Date(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: String,
    pub fire_time: DateTime<Utc>,
    pub kwargs: Json,
}

pub type JobFuture = BoxFuture<'static, Result<(), JobError>>;
pub type JobFunction = Arc<dyn Fn(JobContext) -> JobFuture + Send + Sync>;

#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    JobAdded { job_id: String },
    JobRemoved { job_id: String },
    JobExecuted { job_id: String },
    JobError { job_id: String, message: String },
}

/// Durable backing store for scheduler state. Implemented for
/// `lt_storage::SchedulerJobStore` in production; fakeable in tests.
pub trait JobStore: Send + Sync + 'static {
    fn upsert(&self, job: &ScheduledJobRecord) -> Result<(), SchedulerError>;
    fn get(&self, id: &str) -> Result<ScheduledJobRecord, SchedulerError>;
    fn remove(&self, id: &str) -> Result<(), SchedulerError>;
    fn set_next_run_time(
        &self,
        id: &str,
        next: Option<DateTime<Utc>>,
    ) -> Result<(), SchedulerError>;
    fn set_paused(&self, id: &str, paused: bool) -> Result<(), SchedulerError>;
    fn list_all(&self) -> Result<Vec<ScheduledJobRecord>, SchedulerError>;
    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJobRecord>, SchedulerError>;
}

/// Production `JobStore` backed by the shared sqlite connection.
pub struct SqliteJobStore {
    store: Arc<Store>,
}

impl SqliteJobStore {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl JobStore for SqliteJobStore {
    fn upsert(&self, job: &ScheduledJobRecord) -> Result<(), SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).upsert(job)?)
    }

    fn get(&self, id: &str) -> Result<ScheduledJobRecord, SchedulerError> {
        lt_storage::SchedulerJobStore::new(&self.store)
            .get(id)
            .map_err(|e| match e {
                lt_storage::StorageError::NotFound => SchedulerError::NotFound(id.to_string()),
                other => SchedulerError::Storage(other),
            })
    }

    fn remove(&self, id: &str) -> Result<(), SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).remove(id)?)
    }

    fn set_next_run_time(
        &self,
        id: &str,
        next: Option<DateTime<Utc>>,
    ) -> Result<(), SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).set_next_run_time(id, next)?)
    }

    fn set_paused(&self, id: &str, paused: bool) -> Result<(), SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).set_paused(id, paused)?)
    }

    fn list_all(&self) -> Result<Vec<ScheduledJobRecord>, SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).list_all()?)
    }

    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJobRecord>, SchedulerError> {
        Ok(lt_storage::SchedulerJobStore::new(&self.store).list_due(now)?)
    }
}

struct JobRuntimeState {
    lock: Arc<AsyncMutex<()>>,
    paused: bool,
    misfire_grace: Duration,
}

pub struct Scheduler {
    job_store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    registry: SyncMutex<HashMap<&'static str, JobFunction>>,
    runtime_state: SyncMutex<HashMap<String, JobRuntimeState>>,
    semaphore: Arc<Semaphore>,
    events: broadcast::Sender<SchedulerEvent>,
    tasks: SyncMutex<JoinSet<()>>,
    shutting_down: std::sync::atomic::AtomicBool,
}

impl Scheduler {
    pub fn new(job_store: Arc<dyn JobStore>, clock: Arc<dyn Clock>, max_workers: usize) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(256);
        Arc::new(Self {
            job_store,
            clock,
            registry: SyncMutex::new(HashMap::new()),
            runtime_state: SyncMutex::new(HashMap::new()),
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            events: tx,
            tasks: SyncMutex::new(JoinSet::new()),
            shutting_down: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// Register a job function under a stable name. Job payloads reference
    /// functions by this name, never by serialized closure.
    pub fn register_function(&self, name: &'static str, function: JobFunction) {
        self.registry.lock().insert(name, function);
    }

    pub fn add_interval_job(
        &self,
        id: &str,
        name: &str,
        interval: Duration,
        function_name: &str,
        kwargs: Json,
        misfire_grace_time: Duration,
    ) -> Result<(), SchedulerError> {
        self.add_job(
            id,
            name,
            Trigger::Interval(interval),
            function_name,
            kwargs,
            misfire_grace_time,
        )
    }

    pub fn add_date_job(
        &self,
        id: &str,
        name: &str,
        at: DateTime<Utc>,
        function_name: &str,
        kwargs: Json,
        misfire_grace_time: Duration,
    ) -> Result<(), SchedulerError> {
        self.add_job(
            id,
            name,
            Trigger::Date(at),
            function_name,
            kwargs,
            misfire_grace_time,
        )
    }

    /// Upsert a job definition. If a job with this id is already present in
    /// the store, its persisted `next_run_time` and `paused` state survive
    /// untouched — only the trigger, kwargs, and misfire grace are
    /// refreshed. This is what lets a restart pick a previously-paused job
    /// back up paused instead of silently resuming it.
    fn add_job(
        &self,
        id: &str,
        name: &str,
        trigger: Trigger,
        function_name: &str,
        mut kwargs: Json,
        misfire_grace_time: Duration,
    ) -> Result<(), SchedulerError> {
        if let Json::Object(map) = &mut kwargs {
            map.insert("__fn".to_string(), Json::String(function_name.to_string()));
        }

        let (trigger_kind, trigger_spec, fresh_next_run_time) = match trigger {
            Trigger::Interval(duration) => (
                TriggerKind::Interval,
                serde_json::json!({ "seconds": duration.as_secs() }).to_string(),
                Some(self.clock.now_utc() + chrono::Duration::from_std(duration).unwrap_or_default()),
            ),
            Trigger::Date(at) => (
                TriggerKind::Date,
                serde_json::json!({ "at": at.to_rfc3339() }).to_string(),
                Some(at),
            ),
        };

        let existing = match self.job_store.get(id) {
            Ok(job) => Some(job),
            Err(SchedulerError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let (next_run_time, paused) = match &existing {
            Some(job) => (if job.paused { None } else { job.next_run_time }, job.paused),
            None => (fresh_next_run_time, false),
        };

        self.job_store.upsert(&ScheduledJobRecord {
            id: id.to_string(),
            name: name.to_string(),
            trigger_kind,
            trigger_spec,
            next_run_time,
            kwargs: kwargs.to_string(),
            misfire_grace_time_secs: misfire_grace_time.as_secs() as i64,
            paused,
        })?;

        self.runtime_state.lock().insert(
            id.to_string(),
            JobRuntimeState {
                lock: Arc::new(AsyncMutex::new(())),
                paused,
                misfire_grace: misfire_grace_time,
            },
        );

        let _ = self.events.send(SchedulerEvent::JobAdded { job_id: id.to_string() });
        Ok(())
    }

    /// Whether a job with this id is already present in the durable store.
    pub fn job_exists(&self, id: &str) -> Result<bool, SchedulerError> {
        match self.job_store.get(id) {
            Ok(_) => Ok(true),
            Err(SchedulerError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Load an already-present job's persisted pause state into the
    /// runtime cache without upserting anything. Used at startup for jobs
    /// that survive from a previous process so a restart never flips a
    /// paused job back to running.
    pub fn restore_job(&self, id: &str) -> Result<(), SchedulerError> {
        let job = self.job_store.get(id)?;
        self.runtime_state.lock().insert(
            id.to_string(),
            JobRuntimeState {
                lock: Arc::new(AsyncMutex::new(())),
                paused: job.paused,
                misfire_grace: Duration::from_secs(job.misfire_grace_time_secs.max(0) as u64),
            },
        );
        Ok(())
    }

    pub fn remove_job(&self, id: &str) -> Result<(), SchedulerError> {
        self.job_store.remove(id)?;
        self.runtime_state.lock().remove(id);
        let _ = self.events.send(SchedulerEvent::JobRemoved { job_id: id.to_string() });
        Ok(())
    }

    /// Pause a job: persist `paused = true` and clear `next_run_time` so the
    /// pause survives a restart (`JobStore::list_due` never returns a row
    /// whose `next_run_time` is null).
    pub fn pause_job(&self, id: &str) -> Result<(), SchedulerError> {
        self.job_store.get(id)?;
        self.job_store.set_next_run_time(id, None)?;
        self.job_store.set_paused(id, true)?;

        let mut runtime = self.runtime_state.lock();
        runtime
            .entry(id.to_string())
            .or_insert_with(|| JobRuntimeState {
                lock: Arc::new(AsyncMutex::new(())),
                paused: true,
                misfire_grace: Duration::from_secs(30),
            })
            .paused = true;
        Ok(())
    }

    /// Resume a job: recompute `next_run_time` from its trigger and persist
    /// `paused = false`.
    pub fn resume_job(&self, id: &str) -> Result<(), SchedulerError> {
        let job = self.job_store.get(id)?;
        let next = match job.trigger_kind {
            TriggerKind::Interval => {
                let seconds = parse_interval_seconds(&job.trigger_spec);
                Some(self.clock.now_utc() + chrono::Duration::seconds(seconds as i64))
            }
            TriggerKind::Date => parse_date_trigger(&job.trigger_spec),
        };
        self.job_store.set_next_run_time(id, next)?;
        self.job_store.set_paused(id, false)?;

        let mut runtime = self.runtime_state.lock();
        runtime
            .entry(id.to_string())
            .or_insert_with(|| JobRuntimeState {
                lock: Arc::new(AsyncMutex::new(())),
                paused: false,
                misfire_grace: Duration::from_secs(job.misfire_grace_time_secs.max(0) as u64),
            })
            .paused = false;
        Ok(())
    }

    pub fn pause_all(&self) -> Result<(), SchedulerError> {
        let ids: Vec<String> = self.job_store.list_all()?.into_iter().map(|j| j.id).collect();
        for id in ids {
            self.pause_job(&id)?;
        }
        Ok(())
    }

    pub fn resume_all(&self) -> Result<(), SchedulerError> {
        let ids: Vec<String> = self.job_store.list_all()?.into_iter().map(|j| j.id).collect();
        for id in ids {
            self.resume_job(&id)?;
        }
        Ok(())
    }

    pub fn modify_interval(&self, id: &str, interval: Duration) -> Result<(), SchedulerError> {
        let mut job = self.job_store.get(id)?;
        job.trigger_kind = TriggerKind::Interval;
        job.trigger_spec = serde_json::json!({ "seconds": interval.as_secs() }).to_string();
        job.next_run_time =
            Some(self.clock.now_utc() + chrono::Duration::from_std(interval).unwrap_or_default());
        self.job_store.upsert(&job)
    }

    pub fn get_job(&self, id: &str) -> Result<ScheduledJobRecord, SchedulerError> {
        self.job_store.get(id)
    }

    pub fn get_all_jobs(&self) -> Result<Vec<ScheduledJobRecord>, SchedulerError> {
        self.job_store.list_all()
    }

    fn is_paused(&self, id: &str) -> bool {
        self.runtime_state.lock().get(id).map(|s| s.paused).unwrap_or(false)
    }

    fn job_lock(&self, id: &str) -> Arc<AsyncMutex<()>> {
        self.runtime_state
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| JobRuntimeState {
                lock: Arc::new(AsyncMutex::new(())),
                paused: false,
                misfire_grace: Duration::from_secs(30),
            })
            .lock
            .clone()
    }

    fn misfire_grace(&self, id: &str) -> Duration {
        self.runtime_state
            .lock()
            .get(id)
            .map(|s| s.misfire_grace)
            .unwrap_or(Duration::from_secs(30))
    }

    /// Run every due, unpaused job once. Jobs already mid-flight (per
    /// `max_instances=1`) are skipped this tick, not queued.
    pub fn run_pending(self: &Arc<Self>, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        if self.shutting_down.load(std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }

        for job in self.job_store.list_due(now)? {
            if self.is_paused(&job.id) {
                continue;
            }

            let due = job.next_run_time.unwrap_or(now);
            let grace = self.misfire_grace(&job.id);
            let overdue = now.signed_duration_since(due);
            if overdue > chrono::Duration::from_std(grace).unwrap_or_default() {
                tracing::warn!(job_id = %job.id, "dropping misfired job run");
                self.reschedule(&job, now)?;
                continue;
            }

            let lock = self.job_lock(&job.id);
            let Ok(guard) = lock.try_lock_owned() else {
                tracing::debug!(job_id = %job.id, "job still running, skipping this tick");
                continue;
            };

            self.reschedule(&job, now)?;
            self.spawn_run(job, guard);
        }
        Ok(())
    }

    fn reschedule(&self, job: &ScheduledJobRecord, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        match job.trigger_kind {
            TriggerKind::Interval => {
                let seconds = parse_interval_seconds(&job.trigger_spec);
                let next = now + chrono::Duration::seconds(seconds as i64);
                self.job_store.set_next_run_time(&job.id, Some(next))
            }
            TriggerKind::Date => self.job_store.remove(&job.id),
        }
    }

    fn spawn_run(self: &Arc<Self>, job: ScheduledJobRecord, guard: tokio::sync::OwnedMutexGuard<()>) {
        let function = {
            let registry = self.registry.lock();
            let function_name = function_name_of(&job.kwargs);
            registry.get(function_name.as_str()).cloned()
        };

        let Some(function) = function else {
            tracing::error!(job_id = %job.id, "unknown job function, dropping this run");
            let _ = self.events.send(SchedulerEvent::JobError {
                job_id: job.id.clone(),
                message: "unknown job function".to_string(),
            });
            return;
        };

        let semaphore = self.semaphore.clone();
        let events = self.events.clone();
        let clock = self.clock.clone();
        let job_id = job.id.clone();
        let kwargs: Json = serde_json::from_str(&job.kwargs).unwrap_or(Json::Null);

        let mut tasks = self.tasks.lock();
        tasks.spawn(async move {
            let _guard = guard;
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let context = JobContext { job_id: job_id.clone(), fire_time: clock.now_utc(), kwargs };
            match function(context).await {
                Ok(()) => {
                    let _ = events.send(SchedulerEvent::JobExecuted { job_id: job_id.clone() });
                }
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "job run failed");
                    let _ = events.send(SchedulerEvent::JobError { job_id, message: e.to_string() });
                }
            }
        });
    }

    /// Stop accepting new fires; if `wait`, block until in-flight runs drain.
    pub async fn shutdown(self: Arc<Self>, wait: bool) {
        self.shutting_down.store(true, std::sync::atomic::Ordering::SeqCst);
        if wait {
            let mut tasks = {
                let mut guard = self.tasks.lock();
                std::mem::replace(&mut *guard, JoinSet::new())
            };
            while tasks.join_next().await.is_some() {}
        }
    }
}

fn function_name_of(kwargs_json: &str) -> String {
    serde_json::from_str::<Json>(kwargs_json)
        .ok()
        .and_then(|v| v.get("__fn").and_then(|f| f.as_str()).map(str::to_string))
        .unwrap_or_default()
}

fn parse_interval_seconds(trigger_spec: &str) -> u64 {
    serde_json::from_str::<Json>(trigger_spec)
        .ok()
        .and_then(|v| v.get("seconds").and_then(|s| s.as_u64()))
        .unwrap_or(60)
}

fn parse_date_trigger(trigger_spec: &str) -> Option<DateTime<Utc>> {
    serde_json::from_str::<Json>(trigger_spec)
        .ok()
        .and_then(|v| v.get("at").and_then(|s| s.as_str()).map(str::to_string))
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
