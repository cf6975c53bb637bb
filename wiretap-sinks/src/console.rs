use tracing::{info, warn};
use wiretap_core::config::ConsoleFormat;
use wiretap_core::{LogEntry, LogSink};

/// Default sink: writes each entry to the process log through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    pub fn json() -> Self {
        Self::new(ConsoleFormat::Json)
    }

    pub fn format(&self) -> ConsoleFormat {
        self.format
    }

    /// Text that `deliver` logs for `entry`.
    pub fn render(&self, entry: &LogEntry) -> Option<String> {
        match self.format {
            ConsoleFormat::Text => Some(format!("Log entry: {entry}")),
            ConsoleFormat::Json => match entry.to_json_line() {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(error = %e, id = %entry.id(), "Failed to render log entry as JSON");
                    None
                }
            },
        }
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&self, entry: LogEntry) {
        if let Some(line) = self.render(&entry) {
            info!(target: "wiretap::entry", "{line}");
        }
    }
}
