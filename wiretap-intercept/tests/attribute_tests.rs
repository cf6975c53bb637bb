use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use wiretap_intercept::{Interceptor, ResponseStatus, intercepted};
use wiretap_sinks::MemorySink;

#[derive(Debug, PartialEq, thiserror::Error)]
enum BillingError {
    #[error("400 Bad Request: {0}")]
    Invalid(String),
    #[error("gateway unavailable")]
    Unavailable,
}

struct BillingClient {
    interceptor: Interceptor,
    online: bool,
}

impl BillingClient {
    fn new(sink: &MemorySink, online: bool) -> Self {
        Self {
            interceptor: Interceptor::new("checkout", Arc::new(sink.clone())),
            online,
        }
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    fn charge(&self, amount: u64, currency: &str) -> Result<String, BillingError> {
        if !self.online {
            return Err(BillingError::Unavailable);
        }
        if currency != "USD" {
            return Err(BillingError::Invalid(format!("unsupported currency {currency}")));
        }
        Ok(format!("ch_{amount}"))
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    async fn refund(&self, charge_id: String) -> Result<Option<u64>, BillingError> {
        let id = charge_id.strip_prefix("ch_").ok_or(BillingError::Unavailable)?;
        let _amount: u64 = id.parse().map_err(|_| BillingError::Invalid(id.to_string()))?;
        Ok(None)
    }

    #[intercepted(target = "billing", via = self.interceptor, name = "healthCheck")]
    fn ping(&self) -> u32 {
        204
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    async fn warm_up(&self, regions: Vec<String>) {
        let _ = regions.len();
    }

    #[intercepted(target = "auth", via = self.interceptor)]
    fn login(&self, user: &str, #[wiretap(skip)] password: &str) -> Result<(), BillingError> {
        if password.is_empty() {
            return Err(BillingError::Invalid(format!("empty password for {user}")));
        }
        Ok(())
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    fn explode(&self) -> Result<(), BillingError> {
        panic!("ledger corrupted")
    }
}

struct UsageMeter {
    interceptor: Interceptor,
    hits: u64,
}

impl UsageMeter {
    fn bump(&mut self) {
        self.hits += 1;
    }

    #[intercepted(target = "metering", via = self.interceptor)]
    fn record(&mut self, units: u64) -> Result<u64, String> {
        for _ in 0..units {
            self.bump();
        }
        Ok(self.hits)
    }

    #[intercepted(target = "metering", via = self.interceptor)]
    async fn record_later(&mut self) -> Result<u64, String> {
        tokio::task::yield_now().await;
        self.bump();
        Ok(self.hits)
    }

    #[intercepted(target = "metering", via = self.interceptor)]
    fn reset(&mut self) {
        self.hits = 0;
    }
}

#[intercepted(target = "fx", via = interceptor)]
fn convert(#[wiretap(skip)] interceptor: &Interceptor, amount: u64, rate: f64) -> Result<u64, String> {
    if rate <= 0.0 {
        return Err(format!("invalid rate {rate}"));
    }
    Ok((amount as f64 * rate) as u64)
}

#[test]
fn sync_method_success() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    assert_eq!(client.charge(100, "USD"), Ok("ch_100".to_string()));

    let entry = sink.last().unwrap();
    assert_eq!(entry.source_service(), "checkout");
    assert_eq!(entry.target_service(), "billing");
    assert_eq!(entry.method_name(), "charge");
    assert_eq!(entry.request_body(), r#"{"amount":100,"currency":"USD"}"#);
    assert_eq!(entry.response_body(), Some(r#""ch_100""#));
    assert_eq!(entry.response_status(), Some(ResponseStatus::Ok));
}

#[test]
fn early_return_errors_are_classified() {
    let sink = MemorySink::new();

    let client = BillingClient::new(&sink, true);
    let err = client.charge(5, "EUR").unwrap_err();
    assert_eq!(err, BillingError::Invalid("unsupported currency EUR".into()));
    let warn = sink.last().unwrap();
    assert_eq!(warn.response_status(), Some(ResponseStatus::Warn));
    assert_eq!(
        warn.response_body(),
        Some("BillingError: 400 Bad Request: unsupported currency EUR")
    );

    let offline = BillingClient::new(&sink, false);
    assert_eq!(offline.charge(5, "USD"), Err(BillingError::Unavailable));
    let error = sink.last().unwrap();
    assert_eq!(error.response_status(), Some(ResponseStatus::Error));
    assert_eq!(error.response_body(), Some("BillingError: gateway unavailable"));

    assert_eq!(sink.len(), 2);
}

#[test]
fn non_result_return_is_infallible_and_renamed() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    assert_eq!(client.ping(), 204);

    let entry = sink.last().unwrap();
    assert_eq!(entry.method_name(), "healthCheck");
    assert_eq!(entry.request_body(), "no-args");
    assert_eq!(entry.response_body(), Some("204"));
}

#[test]
fn skipped_parameter_is_not_recorded() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    assert!(client.login("ada", "s3cret").is_ok());

    let entry = sink.last().unwrap();
    assert_eq!(entry.target_service(), "auth");
    assert_eq!(entry.request_body(), r#"{"user":"ada"}"#);
    assert!(!entry.request_body().contains("s3cret"));
}

#[test]
fn free_function_with_interceptor_parameter() {
    let sink = MemorySink::new();
    let interceptor = Interceptor::new("checkout", Arc::new(sink.clone()));

    assert_eq!(convert(&interceptor, 100, 1.5), Ok(150));
    assert!(convert(&interceptor, 100, 0.0).is_err());

    let entries = sink.entries();
    assert_eq!(entries[0].request_body(), r#"{"amount":100,"rate":1.5}"#);
    assert_eq!(entries[1].response_body(), Some("String: invalid rate 0"));
    assert_eq!(entries[1].response_status(), Some(ResponseStatus::Error));
}

#[test]
fn panicking_method_is_recorded() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    let caught = panic::catch_unwind(AssertUnwindSafe(|| client.explode()));
    assert!(caught.is_err());
    assert_eq!(
        sink.last().unwrap().response_body(),
        Some("panic: ledger corrupted")
    );
}

#[tokio::test]
async fn async_method_with_question_mark() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    assert_eq!(client.refund("ch_100".into()).await, Ok(None));
    assert_eq!(
        client.refund("ch_abc".into()).await,
        Err(BillingError::Invalid("abc".into()))
    );

    let entries = sink.entries();
    assert_eq!(entries[0].method_name(), "refund");
    assert_eq!(entries[0].request_body(), r#"{"charge_id":"ch_100"}"#);
    assert_eq!(entries[0].response_body(), Some("no-data"));
    assert_eq!(entries[1].response_status(), Some(ResponseStatus::Warn));
}

#[tokio::test]
async fn async_unit_method() {
    let sink = MemorySink::new();
    let client = BillingClient::new(&sink, true);

    client.warm_up(vec!["eu".into(), "us".into()]).await;

    let entry = sink.last().unwrap();
    assert_eq!(entry.request_body(), r#"{"regions":["eu","us"]}"#);
    assert_eq!(entry.response_body(), Some("no-data"));
    assert_eq!(entry.response_status(), Some(ResponseStatus::Ok));
}

#[tokio::test]
async fn mut_self_methods_can_call_other_mut_methods() {
    let sink = MemorySink::new();
    let mut meter = UsageMeter {
        interceptor: Interceptor::new("checkout", Arc::new(sink.clone())),
        hits: 0,
    };

    assert_eq!(meter.record(3), Ok(3));
    assert_eq!(meter.record_later().await, Ok(4));
    meter.reset();
    assert_eq!(meter.hits, 0);

    let entries = sink.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].request_body(), r#"{"units":3}"#);
    assert_eq!(entries[0].response_body(), Some("3"));
    assert_eq!(entries[1].method_name(), "record_later");
    assert_eq!(entries[1].response_body(), Some("4"));
    assert_eq!(entries[2].method_name(), "reset");
    assert!(entries.iter().all(|e| e.target_service() == "metering"));
}
