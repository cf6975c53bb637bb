use crate::entry::LogEntry;
use std::sync::Arc;

/// Destination for finalized log entries.
///
/// `deliver` takes ownership of the entry and has no error channel: an
/// implementation that can fail reports the failure itself (usually through
/// `tracing`) and returns. Entries arrive concurrently from every thread
/// that makes intercepted calls, so implementations must be `Send + Sync`
/// and serialize internally where needed.
pub trait LogSink: Send + Sync {
    /// Sink name, used in diagnostics.
    fn name(&self) -> &str {
        "custom"
    }

    fn deliver(&self, entry: LogEntry);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deliver(&self, entry: LogEntry) {
        (**self).deliver(entry)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deliver(&self, entry: LogEntry) {
        (**self).deliver(entry)
    }
}
