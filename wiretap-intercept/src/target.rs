use crate::interceptor::Interceptor;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use wiretap_core::CallArgs;

/// An [`Interceptor`] bound to one target service.
///
/// Useful for client structs that talk to a single downstream service:
/// hold one of these instead of repeating the target name at every call.
#[derive(Clone, Debug)]
pub struct TargetService {
    interceptor: Interceptor,
    name: Arc<str>,
}

impl TargetService {
    pub(crate) fn new(interceptor: Interceptor, name: Arc<str>) -> Self {
        Self { interceptor, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn call<T, E, F>(&self, method_name: &str, args: CallArgs, operation: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        self.interceptor
            .execute(operation, method_name, args, &self.name)
    }

    pub fn call_async<T, E, Fut>(
        &self,
        method_name: &str,
        args: CallArgs,
        operation: Fut,
    ) -> impl Future<Output = Result<T, E>> + use<T, E, Fut>
    where
        T: Serialize,
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        self.interceptor
            .execute_async(operation, method_name, args, &self.name)
    }
}
