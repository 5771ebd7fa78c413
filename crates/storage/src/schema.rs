// SPDX-License-Identifier: MIT

//! Embedded schema, applied idempotently at `Store::open`.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS screenshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT NOT NULL UNIQUE,
    file_hash TEXT NOT NULL DEFAULT '',
    width INTEGER NOT NULL,
    height INTEGER NOT NULL,
    screen_id INTEGER NOT NULL,
    app_name TEXT NOT NULL,
    window_title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    file_deleted INTEGER NOT NULL DEFAULT 0,
    event_id INTEGER,
    processed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_screenshots_created_at ON screenshots(created_at);
CREATE INDEX IF NOT EXISTS idx_screenshots_processed ON screenshots(processed);

CREATE TABLE IF NOT EXISTS ocr_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    screenshot_id INTEGER NOT NULL UNIQUE REFERENCES screenshots(id),
    text_content TEXT NOT NULL,
    text_hash TEXT,
    confidence REAL NOT NULL,
    language TEXT NOT NULL,
    processing_time_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ocr_text_hash ON ocr_results(text_hash);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_name TEXT NOT NULL,
    window_title TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    ai_title TEXT,
    ai_summary TEXT
);

CREATE INDEX IF NOT EXISTS idx_events_end_time ON events(end_time);
CREATE INDEX IF NOT EXISTS idx_events_active ON events(end_time) WHERE end_time IS NULL;

CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    ai_title TEXT NOT NULL,
    ai_summary TEXT NOT NULL,
    event_count INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_window ON activities(start_time, end_time);

CREATE TABLE IF NOT EXISTS activity_events (
    activity_id INTEGER NOT NULL REFERENCES activities(id),
    event_id INTEGER NOT NULL UNIQUE REFERENCES events(id),
    PRIMARY KEY (activity_id, event_id)
);

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL,
    due TEXT,
    start_time TEXT,
    deadline TEXT,
    dtstart TEXT,
    item_type TEXT NOT NULL DEFAULT 'VTODO',
    reminder_offsets TEXT NOT NULL DEFAULT '[]',
    user_notes TEXT NOT NULL DEFAULT '',
    priority INTEGER NOT NULL DEFAULT 0,
    tags TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_todos_status ON todos(status);

CREATE TABLE IF NOT EXISTS token_usage (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    model TEXT NOT NULL,
    input_tokens INTEGER NOT NULL,
    output_tokens INTEGER NOT NULL,
    total_tokens INTEGER NOT NULL,
    endpoint TEXT NOT NULL,
    feature_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    input_cost REAL NOT NULL,
    output_cost REAL NOT NULL,
    total_cost REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_token_usage_created_at ON token_usage(created_at);

CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    todo_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    schedule_time TEXT NOT NULL,
    reminder_at TEXT NOT NULL,
    reminder_offset_minutes INTEGER NOT NULL,
    dismissed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_notifications_todo ON notifications(todo_id, reminder_at);

-- Scheduler's durable job store. Logically separate from the rest of
-- storage but kept in the same database file to avoid a second
-- connection/lock domain in a single-process daemon.
CREATE TABLE IF NOT EXISTS scheduler_jobs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    trigger_kind TEXT NOT NULL,
    trigger_spec TEXT NOT NULL,
    next_run_time TEXT,
    kwargs TEXT NOT NULL,
    misfire_grace_time_secs INTEGER NOT NULL,
    paused INTEGER NOT NULL DEFAULT 0
);
"#;
