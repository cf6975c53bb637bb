//! In-memory sink.
//!
//! Collects delivered entries so they can be inspected or drained later.
//! Mostly used by tests and by embedders that forward entries in batches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wiretap_core::{LogEntry, LogSink};

/// Thread-safe buffer of delivered entries. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry delivered so far, in delivery order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Remove and return all buffered entries.
    pub fn drain(&self) -> Vec<LogEntry> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Most recently delivered entry.
    pub fn last(&self) -> Option<LogEntry> {
        self.lock().last().cloned()
    }

    // A panic while holding the lock cannot leave the Vec half-updated.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn deliver(&self, entry: LogEntry) {
        self.lock().push(entry);
    }
}
