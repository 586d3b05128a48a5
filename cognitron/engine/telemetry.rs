use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use cogni_event_bus::{EventPublisher, EventRecord};
use cogni_logging::{JsonLogger, LogBuffer, LogLevel, LogRecord};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::{Handle, Runtime};

/// Builder for engine telemetry sinks.
pub struct EngineTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    buffer: Option<Arc<LogBuffer>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl EngineTelemetryBuilder {
    /// Creates a builder for the named module.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            buffer: None,
            publisher: None,
        }
    }

    /// Routes log records to a JSONL file.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Mirrors log records into an in-memory buffer.
    #[must_use]
    pub fn buffer(mut self, buffer: Arc<LogBuffer>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Routes events to a bus publisher.
    #[must_use]
    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<EngineTelemetry> {
        EngineTelemetry::new(self.module, self.log_path, self.buffer, self.publisher)
    }
}

/// Cloneable telemetry handle shared across engine components.
#[derive(Clone)]
pub struct EngineTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for EngineTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineTelemetry")
            .field("module", &self.inner.module)
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
    buffer: Option<Arc<LogBuffer>>,
    events: Option<EventSink>,
}

struct EventSink {
    // Built lazily: only sync callers outside a runtime ever need it.
    fallback: Mutex<Option<Runtime>>,
    publisher: Arc<dyn EventPublisher>,
}

impl EventSink {
    fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            fallback: Mutex::new(None),
            publisher,
        }
    }

    fn publish(&self, record: EventRecord) -> Result<()> {
        if let Ok(handle) = Handle::try_current() {
            let publisher = Arc::clone(&self.publisher);
            handle.spawn(async move {
                if let Err(err) = publisher.publish(record).await {
                    eprintln!("telemetry publish failed: {err:?}");
                }
            });
            return Ok(());
        }
        let mut fallback = self.fallback.lock();
        if fallback.is_none() {
            *fallback = Some(Runtime::new()?);
        }
        let Some(runtime) = fallback.as_ref() else {
            return Ok(());
        };
        runtime.block_on(self.publisher.publish(record))
    }
}

impl EngineTelemetry {
    fn new(
        module: impl Into<String>,
        log_path: Option<PathBuf>,
        buffer: Option<Arc<LogBuffer>>,
        publisher: Option<Arc<dyn EventPublisher>>,
    ) -> Result<Self> {
        let logger = match log_path {
            Some(path) => Some(JsonLogger::open(path)?),
            None => None,
        };
        let events = publisher.map(EventSink::new);
        Ok(Self {
            inner: Arc::new(TelemetryInner {
                module: module.into(),
                logger,
                buffer,
                events,
            }),
        })
    }

    /// Returns a builder for the named module.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> EngineTelemetryBuilder {
        EngineTelemetryBuilder::new(module)
    }

    /// Writes a structured log record to the configured sinks.
    pub fn log(&self, level: LogLevel, message: &str, fields: &Value) -> Result<()> {
        let record = LogRecord::new(&self.inner.module, level, message).with_fields(fields);
        if let Some(buffer) = &self.inner.buffer {
            buffer.push(record.clone());
        }
        if let Some(logger) = &self.inner.logger {
            logger.write(&record)?;
        }
        Ok(())
    }

    /// Emits an event on the bus.
    pub fn event(&self, kind: &str, payload: Value) -> Result<()> {
        if let Some(events) = &self.inner.events {
            events.publish(EventRecord::new(self.inner.module.clone(), kind, payload))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogni_event_bus::MemoryEventBus;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_fans_out_to_all_sinks() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("engine.log");
        let buffer = Arc::new(LogBuffer::new(16));
        let bus = Arc::new(MemoryEventBus::new(16));
        let telemetry = EngineTelemetry::builder("engine")
            .log_path(&path)
            .buffer(Arc::clone(&buffer))
            .publisher(bus.clone())
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "engine.started", &json!({ "contexts": 0 }))
            .unwrap();
        telemetry
            .event("engine.chain.completed", json!({ "thoughts": 4 }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("engine.started"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(bus.snapshot().len(), 1);
    }
}
