//! Transparent call interception.
//!
//! An [`Interceptor`] runs an operation, records what it was called with and
//! how it ended in a [`LogEntry`], hands the entry to its [`LogSink`] and
//! returns the operation's own result untouched. Attach it with
//! [`#[intercepted]`](intercepted), a [`TargetService`] handle, or by calling
//! [`Interceptor::execute`] directly.

// Lets `#[intercepted]` expand to `::wiretap_intercept::...` inside this crate's tests too.
extern crate self as wiretap_intercept;

mod guard;
pub mod interceptor;
pub mod target;

pub use interceptor::Interceptor;
pub use target::TargetService;
pub use wiretap_core::{
    CallArgs, Failure, LogEntry, LogSink, ResponseStatus, WiretapConfig, WiretapError, call_args,
};
pub use wiretap_macros::intercepted;

#[doc(hidden)]
pub mod __private {
    use std::convert::Infallible;
    use std::future::Future;

    pub use wiretap_core::CallArgs;

    use crate::Interceptor;

    /// Detach the interceptor from the expression that named it.
    #[inline]
    pub fn interceptor(via: &Interceptor) -> Interceptor {
        via.clone()
    }

    #[inline]
    pub fn infallible<T>(value: T) -> Result<T, Infallible> {
        Ok(value)
    }

    /// Pins the output type of an `async` body before it is type-checked.
    #[inline]
    pub fn typed_future<T, F: Future<Output = T>>(future: F) -> F {
        future
    }
}
