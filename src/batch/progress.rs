//! Progress reporting for batch dispatch.
//!
//! Progress is a side channel. Sinks observe the batch but cannot change it.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    ItemFinished {
        index: usize,
        completed: usize,
        total: usize,
        success: bool,
    },
    Finished {
        total: usize,
        successes: usize,
        failures: usize,
        elapsed: Duration,
    },
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards everything.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn report(&self, _event: ProgressEvent) {}
}

pub fn noop_sink() -> Arc<dyn ProgressSink> {
    Arc::new(NoopProgressSink)
}

/// Logs start, every tenth of the batch, and the final tally.
pub struct LogProgressSink {
    label: String,
}

impl LogProgressSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LogProgressSink {
    fn default() -> Self {
        Self::new("LLM calls")
    }
}

impl ProgressSink for LogProgressSink {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                info!(label = %self.label, total, "batch started");
            }
            ProgressEvent::ItemFinished {
                completed, total, ..
            } => {
                let step = (total / 10).max(1);
                if completed % step == 0 || completed == total {
                    info!(label = %self.label, completed, total, "{}/{}", completed, total);
                }
            }
            ProgressEvent::Finished {
                total,
                successes,
                failures,
                elapsed,
            } => {
                info!(
                    label = %self.label,
                    total,
                    successes,
                    failures,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "batch finished"
                );
            }
        }
    }
}

pub fn log_sink() -> Arc<dyn ProgressSink> {
    Arc::new(LogProgressSink::default())
}

/// Records events in memory. Useful in tests.
#[derive(Default)]
pub struct InMemoryProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl InMemoryProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for InMemoryProgressSink {
    fn report(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
