//! Intercepted-call log record.
//!
//! One [`LogEntry`] is built per intercepted call, before the wrapped
//! operation runs. Identity fields (`id`, `timestamp`, source, target,
//! method, request body) are fixed at construction. The two outcome fields
//! are written exactly once each by whichever path finishes the call, after
//! which the entry is handed to a [`LogSink`](crate::sink::LogSink) by value.
//!
//! Text rendering (`Display`):
//!
//! ```text
//! id: 6f0c…
//! sourceService: checkout
//! targetService: billing
//! methodName: charge
//! requestBody: {"amount":100,"currency":"USD"}
//! responseBody: {"status":"ok"}
//! responseStatus: OK
//! timestamp: 17-10-2026/14:03:59
//! ```

use crate::error::WiretapError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Display format for [`LogEntry::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y/%H:%M:%S";

/// Placeholder printed for outcome fields that are not set yet.
const UNSET: &str = "-";

// ─────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────

/// Three-way outcome of an intercepted call.
///
/// Serialised as `"OK"` / `"WARN"` / `"ERROR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// The operation returned normally.
    Ok,
    /// The operation failed with what looks like a client-side error.
    Warn,
    /// Any other failure.
    Error,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::Warn => "WARN",
            ResponseStatus::Error => "ERROR",
        }
    }

    pub fn all() -> &'static [ResponseStatus] {
        &[ResponseStatus::Ok, ResponseStatus::Warn, ResponseStatus::Error]
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single intercepted-call record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    // ── Identity ─────────────────────────────────────────────────
    id: Uuid,
    /// Creation time, captured before the wrapped operation runs.
    timestamp: DateTime<Local>,

    // ── Call ──────────────────────────────────────────────────────
    /// Service issuing the call.
    source_service: String,
    /// Service being called.
    target_service: String,
    method_name: String,
    /// Serialized arguments or one of the `serialize` sentinels.
    request_body: String,

    // ── Outcome (write-once) ──────────────────────────────────────
    response_body: Option<String>,
    response_status: Option<ResponseStatus>,
}

impl LogEntry {
    /// Create an entry with a fresh id and the current local time.
    /// Outcome fields start unset.
    pub fn new(
        source_service: impl Into<String>,
        target_service: impl Into<String>,
        method_name: impl Into<String>,
        request_body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            source_service: source_service.into(),
            target_service: target_service.into(),
            method_name: method_name.into(),
            request_body: request_body.into(),
            response_body: None,
            response_status: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn source_service(&self) -> &str {
        &self.source_service
    }

    pub fn target_service(&self) -> &str {
        &self.target_service
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn request_body(&self) -> &str {
        &self.request_body
    }

    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }

    pub fn response_status(&self) -> Option<ResponseStatus> {
        self.response_status
    }

    /// Set the outcome status. Fails if it was already set; the first value
    /// is kept.
    pub fn set_response_status(&mut self, status: ResponseStatus) -> Result<(), WiretapError> {
        if self.response_status.is_some() {
            return Err(WiretapError::OutcomeAlreadySet("response_status"));
        }
        self.response_status = Some(status);
        Ok(())
    }

    /// Set the outcome body. Fails if it was already set; the first value
    /// is kept.
    pub fn set_response_body(&mut self, body: impl Into<String>) -> Result<(), WiretapError> {
        if self.response_body.is_some() {
            return Err(WiretapError::OutcomeAlreadySet("response_body"));
        }
        self.response_body = Some(body.into());
        Ok(())
    }

    /// Both outcome fields have been written.
    pub fn is_finalized(&self) -> bool {
        self.response_status.is_some() && self.response_body.is_some()
    }

    /// Timestamp in the fixed `dd-MM-yyyy/HH:mm:ss` display format.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Serialise to a compact JSON line suitable for log shipping.
    pub fn to_json_line(&self) -> Result<String, WiretapError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        writeln!(f, "sourceService: {}", self.source_service)?;
        writeln!(f, "targetService: {}", self.target_service)?;
        writeln!(f, "methodName: {}", self.method_name)?;
        writeln!(f, "requestBody: {}", self.request_body)?;
        writeln!(
            f,
            "responseBody: {}",
            self.response_body.as_deref().unwrap_or(UNSET)
        )?;
        writeln!(
            f,
            "responseStatus: {}",
            self.response_status.map(|s| s.as_str()).unwrap_or(UNSET)
        )?;
        writeln!(f, "timestamp: {}", self.formatted_timestamp())
    }
}

// ─────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────
