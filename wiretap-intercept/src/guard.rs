use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error};
use wiretap_core::classify::PANIC_KIND;
use wiretap_core::serialize::serialize_result;
use wiretap_core::{Failure, LogEntry, LogSink, ResponseStatus};

/// Owns the entry of one call and delivers it exactly once, when dropped.
///
/// An entry still missing its outcome at that point belongs to a call that
/// never finished normally: it is recorded as a panic while unwinding and
/// as a cancellation otherwise.
pub(crate) struct DispatchGuard {
    sink: Arc<dyn LogSink>,
    entry: Option<LogEntry>,
}

impl DispatchGuard {
    pub(crate) fn new(sink: Arc<dyn LogSink>, entry: LogEntry) -> Self {
        Self {
            sink,
            entry: Some(entry),
        }
    }

    pub(crate) fn succeed<T: Serialize + ?Sized>(&mut self, value: &T) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let outcome = entry
            .set_response_status(ResponseStatus::Ok)
            .and_then(|()| entry.set_response_body(serialize_result(value)));
        if let Err(e) = outcome {
            debug!(error = %e, kind = e.kind(), id = %entry.id(), "Outcome already recorded");
        }
    }

    pub(crate) fn fail(&mut self, failure: &Failure) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if let Err(e) = failure.apply(entry) {
            debug!(error = %e, kind = e.kind(), id = %entry.id(), "Outcome already recorded");
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        let Some(mut entry) = self.entry.take() else {
            return;
        };

        if !entry.is_finalized() {
            let failure = if thread::panicking() {
                Failure::new(PANIC_KIND, None)
            } else {
                Failure::cancelled()
            };
            // Only the fields still unset are written.
            let _ = entry.set_response_status(failure.status());
            let _ = entry.set_response_body(failure.body());
        }

        debug!(
            id = %entry.id(),
            target_service = entry.target_service(),
            method = entry.method_name(),
            status = entry.response_status().map(|s| s.as_str()).unwrap_or("-"),
            "Intercepted call recorded"
        );

        let sink = self.sink.as_ref();
        let id = entry.id();
        if panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(entry))).is_err() {
            error!(sink = sink.name(), %id, "Sink panicked during delivery");
        }
    }
}
