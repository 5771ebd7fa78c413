// SPDX-License-Identifier: MIT

//! Trace sink (C12): buffers spans per trace id, aggregates on root-span
//! close, and appends to a rotating session JSON file. `emit` never
//! blocks or panics the caller.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCall {
    pub model: String,
    pub duration_ms: u64,
}

/// One span emitted by a component. `is_root` marks the span that, once
/// closed, triggers aggregation and a flush for its trace id.
#[derive(Debug, Clone)]
pub struct Span {
    pub trace_id: String,
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub input: String,
    pub output_preview: String,
    pub status: String,
    pub tool_calls: Vec<ToolCall>,
    pub llm_calls: Vec<LlmCall>,
    pub is_root: bool,
}

#[derive(Debug, Clone, Default)]
struct TraceBuffer {
    span_count: u32,
    duration_ms: u64,
    tool_calls: Vec<ToolCall>,
    llm_calls: Vec<LlmCall>,
    last: Option<Span>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TraceRecord {
    trace_id: String,
    timestamp: DateTime<Utc>,
    duration_ms: u64,
    agent: String,
    input: String,
    output_preview: String,
    tool_calls: Vec<ToolCall>,
    llm_calls: Vec<LlmCall>,
    status: String,
    span_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct TraceSummary {
    total_duration_ms: u64,
    tool_count: u32,
    llm_count: u32,
    trace_count: u32,
    status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    session_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    traces: Vec<TraceRecord>,
    summary: TraceSummary,
}

pub struct TraceSinkConfig {
    pub traces_dir: PathBuf,
    pub max_files: usize,
    pub session_id: String,
}

pub struct TraceSink {
    buffers: Mutex<HashMap<String, TraceBuffer>>,
    config: TraceSinkConfig,
}

impl TraceSink {
    pub fn new(config: TraceSinkConfig) -> Self {
        Self { buffers: Mutex::new(HashMap::new()), config }
    }

    /// Accumulate one span into its trace's buffer. On the root span,
    /// aggregate and append to the session file. Never panics; any
    /// failure is logged and the span is dropped.
    pub fn emit(&self, span: Span) {
        let aggregated = {
            let mut buffers = self.buffers.lock();
            let buffer = buffers.entry(span.trace_id.clone()).or_default();
            buffer.span_count += 1;
            buffer.duration_ms += span.duration_ms;
            buffer.tool_calls.extend(span.tool_calls.clone());
            buffer.llm_calls.extend(span.llm_calls.clone());
            buffer.last = Some(span.clone());

            if span.is_root {
                buffers.remove(&span.trace_id)
            } else {
                None
            }
        };

        let Some(buffer) = aggregated else { return };
        let Some(last) = buffer.last else { return };

        let record = TraceRecord {
            trace_id: span.trace_id,
            timestamp: last.timestamp,
            duration_ms: buffer.duration_ms,
            agent: last.agent,
            input: last.input,
            output_preview: last.output_preview,
            tool_calls: buffer.tool_calls,
            llm_calls: buffer.llm_calls,
            status: last.status,
            span_count: buffer.span_count,
        };

        if let Err(e) = self.append_and_rotate(record) {
            tracing::warn!(error = %e, "trace sink failed to persist trace, dropping");
        }
    }

    fn append_and_rotate(&self, record: TraceRecord) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config.traces_dir)?;
        let path = self.session_file_path();

        let mut file = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes).unwrap_or_else(|_| self.new_session_file())
        } else {
            self.new_session_file()
        };

        file.updated_at = record.timestamp;
        file.summary.total_duration_ms += record.duration_ms;
        file.summary.tool_count += record.tool_calls.len() as u32;
        file.summary.llm_count += record.llm_calls.len() as u32;
        file.summary.trace_count += 1;
        file.summary.status = record.status.clone();
        file.traces.push(record);

        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, bytes)?;

        self.rotate_if_needed()
    }

    fn new_session_file(&self) -> SessionFile {
        let now = Utc::now();
        SessionFile {
            session_id: self.config.session_id.clone(),
            created_at: now,
            updated_at: now,
            traces: Vec::new(),
            summary: TraceSummary::default(),
        }
    }

    fn session_file_path(&self) -> PathBuf {
        self.config
            .traces_dir
            .join(format!("session_{}.json", self.config.session_id))
    }

    fn rotate_if_needed(&self) -> std::io::Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(&self.config.traces_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
            .collect();
        if entries.len() <= self.config.max_files {
            return Ok(());
        }
        entries.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
        let overflow = entries.len() - self.config.max_files;
        for entry in entries.into_iter().take(overflow) {
            let _ = std::fs::remove_file(entry.path());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "trace_sink_tests.rs"]
mod tests;
