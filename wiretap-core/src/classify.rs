//! Outcome classification for failed calls.
//!
//! Classification is a plain substring test on the failure message: a
//! message mentioning `400` or `Bad Request` is a client-side problem and is
//! recorded as `WARN`, everything else is `ERROR`. The error's type is not
//! inspected.

use crate::entry::{LogEntry, ResponseStatus};
use crate::error::WiretapError;
use std::any::Any;
use std::fmt::Display;

/// Substrings that mark a failure as a client-side warning.
pub const WARN_MARKERS: [&str; 2] = ["400", "Bad Request"];

/// Kind recorded for a panicking operation.
pub const PANIC_KIND: &str = "panic";

/// Kind recorded for an async operation dropped before completion.
pub const CANCELLED_KIND: &str = "Cancelled";

/// Rendered in place of an absent failure message.
pub const NO_MESSAGE: &str = "null";

/// Classify a failure message. An absent message never matches.
pub fn classify(message: Option<&str>) -> ResponseStatus {
    match message {
        Some(msg) if WARN_MARKERS.iter().any(|marker| msg.contains(marker)) => {
            ResponseStatus::Warn
        }
        _ => ResponseStatus::Error,
    }
}

/// Response body recorded for a failure: `"<kind>: <message>"`.
pub fn failure_body(kind: &str, message: Option<&str>) -> String {
    format!("{}: {}", kind, message.unwrap_or(NO_MESSAGE))
}

/// Simple name of a type: module path and generic arguments removed.
///
/// `std::io::error::Error` → `Error`, `my_app::BillingError` → `BillingError`.
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// One observed failure of an intercepted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: String,
    pub message: Option<String>,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            message,
        }
    }

    /// Describe an error value by its type name and `Display` text.
    ///
    /// The kind is the static type of `E`, so type-erased errors are named
    /// after their container: `Box<dyn Error>` is recorded as `Box` and
    /// `anyhow::Error` as `Error`. Use [`Failure::new`] to name the kind
    /// explicitly when that matters.
    pub fn from_error<E: Display>(err: &E) -> Self {
        Self::new(simple_type_name::<E>(), Some(err.to_string()))
    }

    /// Describe a panic payload. Only `&str` and `String` payloads carry a
    /// readable message.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        Self::new(PANIC_KIND, message)
    }

    /// Failure recorded for a future dropped before it resolved.
    pub fn cancelled() -> Self {
        Self::new(
            CANCELLED_KIND,
            Some("operation dropped before completion".to_string()),
        )
    }

    pub fn status(&self) -> ResponseStatus {
        classify(self.message.as_deref())
    }

    pub fn body(&self) -> String {
        failure_body(&self.kind, self.message.as_deref())
    }

    /// Write this failure's status and body into `entry`.
    pub fn apply(&self, entry: &mut LogEntry) -> Result<(), WiretapError> {
        entry.set_response_status(self.status())?;
        entry.set_response_body(self.body())
    }
}
