use crate::file_writer::{RotatingFileWriter, RotationPolicy};
use std::io;
use tracing::error;
use wiretap_core::config::FileSinkConfig;
use wiretap_core::{LogEntry, LogSink};

/// Appends one JSON line per entry to a rotating file.
///
/// Write failures are logged and the entry is dropped; the caller of the
/// intercepted operation never sees them.
pub struct JsonFileSink {
    writer: RotatingFileWriter,
}

impl JsonFileSink {
    pub fn new(policy: RotationPolicy) -> io::Result<Self> {
        Ok(Self {
            writer: RotatingFileWriter::new(policy)?,
        })
    }

    pub fn from_config(cfg: &FileSinkConfig) -> io::Result<Self> {
        Self::new(RotationPolicy::from(cfg))
    }

    pub fn writer(&self) -> &RotatingFileWriter {
        &self.writer
    }
}

impl LogSink for JsonFileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn deliver(&self, entry: LogEntry) {
        let line = match entry.to_json_line() {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, id = %entry.id(), "Failed to render log entry");
                return;
            }
        };

        if let Err(e) = self.writer.write_line(&line) {
            error!(
                error = %e,
                id = %entry.id(),
                path = %self.writer.path().display(),
                "Failed to write log entry"
            );
        }
    }
}
