use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use wiretap_core::{LogEntry, LogSink};

/// Fan-out sink: every entry goes to each member, in registration order.
///
/// A member that panics is logged and skipped; the remaining members still
/// receive the entry.
#[derive(Clone, Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl CompositeSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    /// Add a member sink.
    pub fn with(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Member sink names, in delivery order.
    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl LogSink for CompositeSink {
    fn name(&self) -> &str {
        "composite"
    }

    fn deliver(&self, entry: LogEntry) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };

        for sink in rest {
            deliver_isolated(sink.as_ref(), entry.clone());
        }
        deliver_isolated(last.as_ref(), entry);
    }
}

fn deliver_isolated(sink: &dyn LogSink, entry: LogEntry) {
    let id = entry.id();
    if panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(entry))).is_err() {
        error!(sink = sink.name(), %id, "Sink panicked during delivery");
    }
}
