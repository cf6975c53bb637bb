use std::fs;
use std::sync::Arc;
use wiretap_core::config::{ConsoleFormat, SinkConfig};
use wiretap_core::{LogEntry, LogSink, ResponseStatus};
use wiretap_sinks::{build_sink, CompositeSink, ConsoleSink, JsonFileSink, MemorySink};

fn finished(method: &str, status: ResponseStatus, body: &str) -> LogEntry {
    let mut e = LogEntry::new("checkout", "billing", method, "no-args");
    e.set_response_status(status).unwrap();
    e.set_response_body(body).unwrap();
    e
}

// =============================================================================
// Builder
// =============================================================================

#[test]
fn test_builder_fans_out_to_console_and_file() {
    let dir = std::env::temp_dir().join(format!("wiretap-sink-tests-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let mut cfg = SinkConfig::default();
    cfg.console.format = ConsoleFormat::Json;
    cfg.file.enabled = true;
    cfg.file.path = dir.join("calls.log");

    let sink = build_sink(&cfg).unwrap();
    assert_eq!(sink.name(), "composite");

    sink.deliver(finished("charge", ResponseStatus::Warn, "HttpError: 400 Bad Request"));

    let content = fs::read_to_string(dir.join("calls.log")).unwrap();
    let json: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(json["response_status"], "WARN");
    assert_eq!(json["response_body"], "HttpError: 400 Bad Request");

    let _ = fs::remove_dir_all(&dir);
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn test_nested_composites_deliver_once_per_leaf() {
    let a = MemorySink::new();
    let b = MemorySink::new();
    let inner = CompositeSink::default().with(Arc::new(b.clone()));
    let outer = CompositeSink::default()
        .with(Arc::new(a.clone()))
        .with(Arc::new(inner))
        .with(Arc::new(ConsoleSink::default()));

    outer.deliver(finished("refund", ResponseStatus::Ok, "no-data"));

    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(outer.names(), vec!["memory", "composite", "console"]);
}

#[test]
fn test_file_sink_reopens_existing_file_in_append_mode() {
    let dir = std::env::temp_dir().join(format!("wiretap-sink-append-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let cfg = wiretap_core::config::FileSinkConfig {
        enabled: true,
        path: dir.join("calls.log"),
        max_file_size_bytes: 0,
        max_rotated_files: 0,
    };

    JsonFileSink::from_config(&cfg)
        .unwrap()
        .deliver(finished("first", ResponseStatus::Ok, "1"));
    JsonFileSink::from_config(&cfg)
        .unwrap()
        .deliver(finished("second", ResponseStatus::Error, "Timeout: slow"));

    let content = fs::read_to_string(&cfg.path).unwrap();
    assert_eq!(content.lines().count(), 2);

    let _ = fs::remove_dir_all(&dir);
}
