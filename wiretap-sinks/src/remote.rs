use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Duration, interval};
use tracing::{debug, error, warn};
use wiretap_core::config::RemoteSinkConfig;
use wiretap_core::{LogEntry, LogSink};

/// Batched HTTP push sink.
///
/// `deliver` never blocks: the rendered entry goes into a bounded channel
/// with `try_send`, and a background task POSTs batches as newline-delimited
/// JSON whenever `batch_size` entries are queued or `flush_interval_secs`
/// elapses. A full channel drops the entry with a warning.
pub struct HttpPushSink {
    sender: mpsc::Sender<String>,
}

impl HttpPushSink {
    /// Must be called from within a tokio runtime.
    pub fn new(config: RemoteSinkConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        tokio::spawn(Self::flush_loop(config, rx));
        Self { sender: tx }
    }

    async fn flush_loop(config: RemoteSinkConfig, mut rx: mpsc::Receiver<String>) {
        let client = reqwest::Client::new();
        let batch_size = config.batch_size.max(1);
        let mut batch: Vec<String> = Vec::with_capacity(batch_size);
        let mut flush_interval = interval(Duration::from_secs(config.flush_interval_secs.max(1)));

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(line) => {
                        batch.push(line);
                        if batch.len() >= batch_size {
                            Self::flush(&client, &config.endpoint, &mut batch).await;
                        }
                    }
                    None => {
                        // Every sender dropped: ship what is left and stop.
                        Self::flush(&client, &config.endpoint, &mut batch).await;
                        break;
                    }
                },
                _ = flush_interval.tick() => {
                    Self::flush(&client, &config.endpoint, &mut batch).await;
                }
            }
        }
    }

    async fn flush(client: &reqwest::Client, endpoint: &str, batch: &mut Vec<String>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        let mut body = batch.join("\n");
        body.push('\n');
        batch.clear();

        match client
            .post(endpoint)
            .header("Content-Type", "application/stream+json")
            .body(body)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                debug!(count, "Flushed log entries");
            }
            Ok(resp) => {
                error!(status = %resp.status(), count, "Log entry push rejected");
            }
            Err(e) => {
                error!(error = %e, count, at = %Utc::now().to_rfc3339(), "Log entry push failed");
            }
        }
    }
}

impl LogSink for HttpPushSink {
    fn name(&self) -> &str {
        "remote"
    }

    fn deliver(&self, entry: LogEntry) {
        let line = match entry.to_json_line() {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, id = %entry.id(), "Failed to render log entry");
                return;
            }
        };

        match self.sender.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(id = %entry.id(), "Remote sink queue full, dropping log entry");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(id = %entry.id(), "Remote sink stopped, dropping log entry");
            }
        }
    }
}
