// SPDX-License-Identifier: MIT

//! Embedded SQLite storage for every entity the daemon persists. One
//! process, one connection, one file.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod activity;
pub mod error;
pub mod event;
pub mod notification;
pub mod ocr;
pub mod schema;
pub mod scheduler_jobs;
pub mod screenshot;
pub mod store;
pub mod todo;
pub mod token_usage;

pub use activity::{Activity, ActivityId, ActivityManager};
pub use error::{Result, StorageError};
pub use event::{Event, EventId, EventManager};
pub use notification::{Notification, NotificationId, NotificationManager};
pub use ocr::{NewOcrResult, OcrManager, OcrResult, OcrResultId};
pub use scheduler_jobs::{ScheduledJobRecord, SchedulerJobStore, TriggerKind};
pub use screenshot::{NewScreenshot, Screenshot, ScreenshotId, ScreenshotManager};
pub use store::Store;
pub use todo::{ItemType, NewTodo, Todo, TodoId, TodoManager, TodoStatus};
pub use token_usage::{NewTokenUsage, TokenUsageId, TokenUsageManager, UsageTotals};
