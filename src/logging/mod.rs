//! Structured JSON logging for the panel engine.
//!
//! Every subsystem emits [`LogEvent`]s through a cloneable [`Logger`] that
//! forwards to a [`LogSink`]. The engine never fails because a sink failed;
//! callers drop the returned error after a best-effort write.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub const TARGET_HOST: &str = "panel::host";
pub const TARGET_LAYOUT: &str = "panel::layout";
pub const TARGET_PLACEMENT: &str = "panel::placement";
pub const TARGET_VISIBILITY: &str = "panel::visibility";
pub const TARGET_BUS: &str = "panel::bus";
pub const TARGET_METRICS: &str = "panel::metrics";

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("log sink poisoned")]
    Poisoned,
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
            min_level: LogLevel::Trace,
        }
    }

    /// Drop events below `level` before they reach the sink.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        self.log_event(LogEvent::new(level, target, message))
    }

    pub fn log_with_fields(
        &self,
        level: LogLevel,
        target: &str,
        message: &str,
        fields: LogFields,
    ) -> LoggingResult<()> {
        self.log_event(LogEvent::with_fields(level, target, message, fields))
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        if event.level < self.min_level {
            return Ok(());
        }
        self.sink.log(&event)
    }
}

/// Append-only JSON lines file, truncated once it would grow past `max_bytes`.
pub struct FileSink {
    path: PathBuf,
    max_bytes: u64,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_bytes,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, mut line: String) -> LoggingResult<()> {
        line.push('\n');
        let mut guard = self.writer.lock().map_err(|_| LoggingError::Poisoned)?;

        if self.should_rotate(guard.get_ref(), line.len() as u64)? {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            *guard = BufWriter::new(file);
        }

        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }

    fn should_rotate(&self, file: &File, incoming_len: u64) -> std::io::Result<bool> {
        if self.max_bytes == 0 {
            return Ok(false);
        }
        let current = file.metadata()?.len();
        Ok(current + incoming_len > self.max_bytes)
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let line = serde_json::to_string(event)?;
        self.write_line(line)
    }
}

/// In-memory sink; clones share the same buffer.
#[derive(Clone, Default)]
pub struct BufferSink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }
}

impl LogSink for BufferSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut guard = self.events.lock().map_err(|_| LoggingError::Poisoned)?;
        guard.push(event.clone());
        Ok(())
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    let map: LogFields = fields.into_iter().collect();
    LogEvent::with_fields(level, target, message, map)
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

/// Best-effort emit through an optional logger.
pub(crate) fn emit<I>(
    logger: Option<&Logger>,
    level: LogLevel,
    target: &str,
    message: &str,
    fields: I,
) where
    I: IntoIterator<Item = (String, Value)>,
{
    if let Some(logger) = logger {
        let _ = logger.log_event(event_with_fields(level, target, message, fields));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buffer_sink_collects_events_in_order() {
        let sink = BufferSink::new();
        let logger = Logger::new(sink.clone());
        logger.log(LogLevel::Info, TARGET_HOST, "first").unwrap();
        logger
            .log_event(event_with_fields(
                LogLevel::Debug,
                TARGET_BUS,
                "second",
                [json_kv("topic", json!("pointer_move"))],
            ))
            .unwrap();

        let events = sink.events();
        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert_eq!(events[1].field("topic"), Some(&json!("pointer_move")));
    }

    #[test]
    fn min_level_filters_before_sink() {
        let sink = BufferSink::new();
        let logger = Logger::new(sink.clone()).with_min_level(LogLevel::Warn);
        logger.log(LogLevel::Debug, TARGET_HOST, "quiet").unwrap();
        logger.log(LogLevel::Warn, TARGET_HOST, "loud").unwrap();
        assert_eq!(sink.messages(), vec!["loud"]);
    }

    #[test]
    fn file_sink_writes_json_lines_and_truncates() {
        let path = std::env::temp_dir().join(format!(
            "overlay_panel_log_{}_{}.jsonl",
            std::process::id(),
            current_ms()
        ));
        let sink = FileSink::new(&path, 200).unwrap();
        let logger = Logger::new(sink);
        for idx in 0..10 {
            logger
                .log_event(event_with_fields(
                    LogLevel::Info,
                    TARGET_HOST,
                    "line",
                    [json_kv("idx", json!(idx))],
                ))
                .unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.len() as u64 <= 200);
        for line in written.lines() {
            let value: Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["message"], json!("line"));
        }
        let _ = std::fs::remove_file(&path);
    }
}
