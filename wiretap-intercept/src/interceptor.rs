use crate::guard::DispatchGuard;
use crate::target::TargetService;
use serde::Serialize;
use std::fmt::{self, Display};
use std::future::{Future, poll_fn};
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::sync::Arc;
use std::task::Poll;
use wiretap_core::serialize::serialize_arguments;
use wiretap_core::{CallArgs, Failure, LogEntry, LogSink, WiretapConfig};

/// Wraps operations so every call produces exactly one [`LogEntry`].
///
/// Cloning is cheap; clones share the source-service name and the sink.
#[derive(Clone)]
pub struct Interceptor {
    source_service: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl Interceptor {
    pub fn new(source_service: impl Into<Arc<str>>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            source_service: source_service.into(),
            sink,
        }
    }

    /// Use the configured application name as the source service.
    pub fn from_config(config: &WiretapConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::new(config.source_service_name(), sink)
    }

    pub fn source_service(&self) -> &str {
        &self.source_service
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Handle that records calls against one target service.
    pub fn target(&self, target_service: impl Into<Arc<str>>) -> TargetService {
        TargetService::new(self.clone(), target_service.into())
    }

    fn begin(&self, method_name: &str, args: &CallArgs, target_service: &str) -> DispatchGuard {
        let entry = LogEntry::new(
            &*self.source_service,
            target_service,
            method_name,
            serialize_arguments(args),
        );
        DispatchGuard::new(Arc::clone(&self.sink), entry)
    }

    /// Run `operation` and record its outcome.
    ///
    /// The return value is exactly what `operation` returned. An `Err` is
    /// recorded as `WARN` when its message mentions `400` or `Bad Request`
    /// and as `ERROR` otherwise. A panic is recorded and then resumed with
    /// the original payload.
    pub fn execute<T, E, F>(
        &self,
        operation: F,
        method_name: &str,
        args: CallArgs,
        target_service: &str,
    ) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let mut guard = self.begin(method_name, &args, target_service);

        match panic::catch_unwind(AssertUnwindSafe(operation)) {
            Ok(Ok(value)) => {
                guard.succeed(&value);
                drop(guard);
                Ok(value)
            }
            Ok(Err(err)) => {
                guard.fail(&Failure::from_error(&err));
                drop(guard);
                Err(err)
            }
            Err(payload) => {
                guard.fail(&Failure::from_panic(&*payload));
                drop(guard);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Async counterpart of [`execute`](Self::execute).
    ///
    /// The entry is created when this is called. If the returned future is
    /// dropped before `operation` resolves, the call is recorded as
    /// `Cancelled`.
    pub fn execute_async<T, E, Fut>(
        &self,
        operation: Fut,
        method_name: &str,
        args: CallArgs,
        target_service: &str,
    ) -> impl Future<Output = Result<T, E>> + use<T, E, Fut>
    where
        T: Serialize,
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut guard = self.begin(method_name, &args, target_service);

        async move {
            let mut operation = pin!(operation);
            let outcome = poll_fn(|cx| {
                match panic::catch_unwind(AssertUnwindSafe(|| operation.as_mut().poll(cx))) {
                    Ok(Poll::Ready(result)) => Poll::Ready(Ok(result)),
                    Ok(Poll::Pending) => Poll::Pending,
                    Err(payload) => Poll::Ready(Err(payload)),
                }
            })
            .await;

            match outcome {
                Ok(Ok(value)) => {
                    guard.succeed(&value);
                    drop(guard);
                    Ok(value)
                }
                Ok(Err(err)) => {
                    guard.fail(&Failure::from_error(&err));
                    drop(guard);
                    Err(err)
                }
                Err(payload) => {
                    guard.fail(&Failure::from_panic(&*payload));
                    drop(guard);
                    panic::resume_unwind(payload)
                }
            }
        }
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("source_service", &self.source_service)
            .field("sink", &self.sink.name())
            .finish()
    }
}
