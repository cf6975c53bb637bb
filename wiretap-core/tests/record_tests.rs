use serde::Serialize;
use wiretap_core::classify::{classify, Failure};
use wiretap_core::serialize::{serialize_arguments, serialize_result, NO_ARGS, NO_DATA};
use wiretap_core::{call_args, CallArgs, LogEntry, ResponseStatus};

#[derive(Serialize)]
struct ChargeResponse {
    status: &'static str,
}

#[derive(Debug)]
struct HttpClientError(String);

impl std::fmt::Display for HttpClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Billing scenario, assembled by hand
// =============================================================================

#[test]
fn test_successful_charge_record() {
    let amount = 100;
    let currency = "USD";
    let args = call_args!(amount, currency);

    let mut entry = LogEntry::new("checkout", "billing", "charge", serialize_arguments(&args));
    entry.set_response_status(ResponseStatus::Ok).unwrap();
    entry
        .set_response_body(serialize_result(&ChargeResponse { status: "ok" }))
        .unwrap();

    assert_eq!(entry.method_name(), "charge");
    assert_eq!(entry.request_body(), r#"{"amount":100,"currency":"USD"}"#);
    assert_eq!(entry.response_status(), Some(ResponseStatus::Ok));
    assert_eq!(entry.response_body(), Some(r#"{"status":"ok"}"#));
    assert!(entry.is_finalized());
}

#[test]
fn test_bad_request_charge_record() {
    let err = HttpClientError("400 Bad Request: invalid currency".into());
    let mut entry = LogEntry::new("checkout", "billing", "charge", NO_ARGS);
    Failure::from_error(&err).apply(&mut entry).unwrap();

    assert_eq!(entry.response_status(), Some(ResponseStatus::Warn));
    assert_eq!(
        entry.response_body(),
        Some("HttpClientError: 400 Bad Request: invalid currency")
    );
}

#[test]
fn test_no_args_and_no_data() {
    assert_eq!(serialize_arguments(&CallArgs::new()), "no-args");
    assert_eq!(serialize_result(&None::<ChargeResponse>), NO_DATA);
}

// =============================================================================
// Serializer properties
// =============================================================================

#[test]
fn test_single_arg_is_valid_json() {
    let args = CallArgs::new().with("a", &1);
    let text = serialize_arguments(&args);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["a"], 1);
}

#[test]
fn test_nested_values_keep_field_order() {
    #[derive(Serialize)]
    struct Address {
        street: &'static str,
        city: &'static str,
    }
    let args = CallArgs::new().with("to", &Address { street: "Main", city: "Oslo" });
    assert_eq!(
        serialize_arguments(&args),
        r#"{"to":{"street":"Main","city":"Oslo"}}"#
    );
}

// =============================================================================
// Classifier properties
// =============================================================================

#[test]
fn test_warn_iff_marker_present() {
    let cases = [
        ("400", ResponseStatus::Warn),
        ("HTTP 400", ResponseStatus::Warn),
        ("Bad Request", ResponseStatus::Warn),
        ("got Bad Request from upstream", ResponseStatus::Warn),
        ("404 Not Found", ResponseStatus::Error),
        ("503 Service Unavailable", ResponseStatus::Error),
        ("bad request", ResponseStatus::Error),
    ];
    for (msg, expected) in cases {
        assert_eq!(classify(Some(msg)), expected, "message: {msg}");
    }
}
