#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON line logging shared by the Cognitron crates.

use std::{
    collections::VecDeque,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic chatter.
    Debug,
    /// Normal operational events.
    Info,
    /// Degraded but recoverable conditions.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Lowercase label used in rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One structured log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Capture time.
    pub at: DateTime<Utc>,
    /// Emitting module (e.g. `engine`, `pipeline`).
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Structured payload fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attaches structured fields taken from a JSON object.
    #[must_use]
    pub fn with_fields(mut self, value: &serde_json::Value) -> Self {
        if let Some(map) = value.as_object() {
            self.fields = map.clone();
        }
        self
    }
}

/// Append-only JSONL logger guarded for concurrent writers.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLogger {
    /// Opens (or creates) the log file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends one record as a JSON line and flushes.
    pub fn write(&self, record: &LogRecord) -> Result<()> {
        let mut file = self.file.lock();
        serde_json::to_writer(&mut *file, record)?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    /// Path backing this logger.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Bounded in-memory ring of recent records, for status views and tests.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl LogBuffer {
    /// Creates a buffer retaining at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Pushes a record, evicting the oldest when full.
    pub fn push(&self, record: LogRecord) {
        let mut records = self.records.lock();
        records.push_back(record);
        if records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Most recent `count` records, oldest first.
    #[must_use]
    pub fn tail(&self, count: usize) -> Vec<LogRecord> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(count);
        records.iter().skip(skip).cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn logger_appends_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::open(dir.path().join("logs/engine.log")).unwrap();
        logger
            .write(
                &LogRecord::new("engine", LogLevel::Info, "chain completed")
                    .with_fields(&json!({ "thoughts": 7 })),
            )
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("\"message\":\"chain completed\""));
        assert!(content.contains("\"thoughts\":7"));
    }

    #[test]
    fn buffer_evicts_oldest() {
        let buffer = LogBuffer::new(2);
        for message in ["a", "b", "c"] {
            buffer.push(LogRecord::new("engine", LogLevel::Debug, message));
        }
        let tail = buffer.tail(10);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].message, "b");
        assert_eq!(tail[1].message, "c");
    }
}
