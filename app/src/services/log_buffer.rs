//! Recent tracing events kept in memory for `/api/logs`.

use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

pub const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    pub fields: Map<String, Value>,
}

/// Fixed-capacity ring of log entries; the oldest entry is evicted first.
pub struct LogBuffer {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

static GLOBAL: LazyLock<LogBuffer> = LazyLock::new(|| LogBuffer::new(MAX_LOG_ENTRIES));

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Buffer fed by [`LogCaptureLayer`].
    pub fn global() -> &'static LogBuffer {
        &GLOBAL
    }

    pub fn push(&self, entry: LogEntry) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `limit` newest entries at `min_level` or more severe, oldest first.
    pub fn recent(&self, limit: usize, min_level: Option<Level>) -> Vec<LogEntry> {
        let Ok(entries) = self.entries.lock() else {
            return Vec::new();
        };
        let keep = |e: &&LogEntry| match min_level {
            Some(min) => e.level.parse::<Level>().is_ok_and(|l| l <= min),
            None => true,
        };

        let mut logs: Vec<_> = entries
            .iter()
            .rev()
            .filter(keep)
            .take(limit.clamp(1, self.capacity))
            .cloned()
            .collect();
        logs.reverse();
        logs
    }

    /// Drop everything; returns how many entries were removed.
    pub fn clear(&self) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let cleared = entries.len();
        entries.clear();
        cleared
    }
}

/// Layer that copies every event into [`LogBuffer::global`].
#[derive(Default)]
pub struct LogCaptureLayer;

impl LogCaptureLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        LogBuffer::global().push(capture(event));
    }
}

fn capture(event: &Event<'_>) -> LogEntry {
    let mut fields = FieldCollector::default();
    event.record(&mut fields);
    let meta = event.metadata();

    LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: meta.level().as_str().to_lowercase(),
        target: meta.target().to_string(),
        message: fields.message.unwrap_or_else(|| meta.name().to_string()),
        fields: fields.values,
    }
}

/// Collects event fields as JSON, pulling `message` out separately.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(s)) => self.message = Some(s),
            ("message", other) => self.message = Some(other.to_string()),
            (name, value) => {
                self.values.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}").into());
    }
}
