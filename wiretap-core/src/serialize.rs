//! Rendering of call arguments and results into storable strings.
//!
//! Both functions are total: a serialization failure is reported as a
//! sentinel string and never reaches the caller.

use crate::args::CallArgs;
use serde::Serialize;

pub const NO_ARGS: &str = "no-args";
pub const ARGS_FORMATTING_FAILED: &str = "args-formatting-failed";
pub const NO_DATA: &str = "no-data";
pub const RESPONSE_FORMATTING_FAILED: &str = "response-formatting-failed";

/// JSON object of the call's arguments, `"no-args"` when there are none, or
/// `"args-formatting-failed"`.
pub fn serialize_arguments(args: &CallArgs) -> String {
    if args.is_empty() {
        return NO_ARGS.to_string();
    }

    match serde_json::to_string(args) {
        Ok(json) => json,
        Err(e) => {
            tracing::debug!(error = %e, "argument serialization failed");
            ARGS_FORMATTING_FAILED.to_string()
        }
    }
}

/// JSON rendering of a call result, `"no-data"` for a value that renders as
/// `null` (`None`, `()`), or `"response-formatting-failed"`.
pub fn serialize_result<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) if json == "null" => NO_DATA.to_string(),
        Ok(json) => json,
        Err(e) => {
            tracing::debug!(error = %e, "result serialization failed");
            RESPONSE_FORMATTING_FAILED.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Exploding;

    impl Serialize for Exploding {
        fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("boom"))
        }
    }

    #[derive(Serialize)]
    struct Receipt {
        status: &'static str,
        amount: u64,
    }

    #[test]
    fn empty_args_render_sentinel() {
        assert_eq!(serialize_arguments(&CallArgs::new()), NO_ARGS);
    }

    #[test]
    fn args_render_as_ordered_object() {
        let args = CallArgs::new().with("amount", &100).with("currency", &"USD");
        assert_eq!(serialize_arguments(&args), r#"{"amount":100,"currency":"USD"}"#);
    }

    #[test]
    fn failing_arg_renders_sentinel() {
        let args = CallArgs::new().with("a", &1).with("b", &Exploding);
        assert_eq!(serialize_arguments(&args), ARGS_FORMATTING_FAILED);
    }

    #[test]
    fn none_and_unit_render_no_data() {
        assert_eq!(serialize_result(&Option::<u32>::None), NO_DATA);
        assert_eq!(serialize_result(&()), NO_DATA);
    }

    #[test]
    fn struct_result_keeps_field_order() {
        let r = Receipt { status: "ok", amount: 5 };
        assert_eq!(serialize_result(&r), r#"{"status":"ok","amount":5}"#);
    }

    #[test]
    fn failing_result_renders_sentinel() {
        assert_eq!(serialize_result(&Exploding), RESPONSE_FORMATTING_FAILED);
    }

    #[test]
    fn string_result_is_json_quoted() {
        assert_eq!(serialize_result("hi"), "\"hi\"");
    }
}
