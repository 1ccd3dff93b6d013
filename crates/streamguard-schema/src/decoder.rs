use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::coerce::apply_coercions;
use crate::descriptor::SchemaDescriptor;
use crate::error::DataValidationError;
use crate::observer::{DecodeObserver, TracingObserver};
use crate::report::summarize;

/// Number of leading array elements included in trace previews.
pub const PREVIEW_ELEMENTS: usize = 3;

/// Outcome of a single decode call.
pub type DecodeResult<T> = std::result::Result<T, DecodeErrors>;

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeIssue {
    /// Accessor from the root of the decoded value, e.g. `$[0].price`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for DecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Ordered list of violations produced by a failed decode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeErrors {
    issues: Vec<DecodeIssue>,
}

impl DecodeErrors {
    pub fn new(issues: Vec<DecodeIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[DecodeIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues rendered as `"{path}: {message}"`.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Bounded summary of all issues.
    pub fn summary(&self) -> String {
        summarize(&self.messages())
    }

    /// Convert into the error carried on the failure path.
    pub fn into_validation_error(self, schema: &str) -> DataValidationError {
        DataValidationError {
            schema: schema.to_string(),
            error_count: self.len(),
            message: self.summary(),
        }
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for DecodeErrors {}

impl IntoIterator for DecodeErrors {
    type Item = DecodeIssue;
    type IntoIter = std::vec::IntoIter<DecodeIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

/// Validate `value` against `schema`, returning the coerced value.
pub fn decode(value: &Value, schema: &SchemaDescriptor) -> DecodeResult<Value> {
    decode_with_observer(value, schema, &TracingObserver)
}

/// [`decode`] with an explicit observer.
pub fn decode_with_observer(
    value: &Value,
    schema: &SchemaDescriptor,
    observer: &dyn DecodeObserver,
) -> DecodeResult<Value> {
    observer.decode_started(schema.name(), value);

    let mut coerced = value.clone();
    apply_coercions(&mut coerced, schema.coercions());

    let issues: Vec<DecodeIssue> = schema
        .validator()
        .iter_errors(&coerced)
        .map(|err| DecodeIssue {
            path: accessor_path(&err.instance_path().to_string()),
            message: err.to_string(),
        })
        .collect();

    observer.decode_finished(schema.name(), issues.len());

    if issues.is_empty() {
        Ok(coerced)
    } else {
        Err(DecodeErrors::new(issues))
    }
}

/// Validate `value` against `schema` and deserialize the coerced value into `T`.
pub fn decode_as<T: DeserializeOwned>(value: &Value, schema: &SchemaDescriptor) -> DecodeResult<T> {
    decode_as_with_observer(value, schema, &TracingObserver)
}

/// [`decode_as`] with an explicit observer.
pub fn decode_as_with_observer<T: DeserializeOwned>(
    value: &Value,
    schema: &SchemaDescriptor,
    observer: &dyn DecodeObserver,
) -> DecodeResult<T> {
    let coerced = decode_with_observer(value, schema, observer)?;
    serde_json::from_value(coerced).map_err(|err| {
        DecodeErrors::new(vec![DecodeIssue {
            path: "$".to_string(),
            message: err.to_string(),
        }])
    })
}

/// The part of `value` worth tracing: the first few elements of an array,
/// or the value itself.
pub fn preview(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Array(items) if items.len() > PREVIEW_ELEMENTS => {
            Cow::Owned(Value::Array(items[..PREVIEW_ELEMENTS].to_vec()))
        }
        _ => Cow::Borrowed(value),
    }
}

/// Turn a JSON pointer (`/0/price`) into an accessor (`$[0].price`).
fn accessor_path(pointer: &str) -> String {
    let mut path = String::from("$");
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else if is_plain_key(&segment) {
            path.push('.');
            path.push_str(&segment);
        } else {
            path.push('[');
            path.push_str(&Value::String(segment).to_string());
            path.push(']');
        }
    }
    path
}

fn is_plain_key(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    const LEVELS: &str = r#"{
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "price": { "type": "number" },
                "size": { "type": "number" }
            },
            "required": ["price", "size"]
        },
        "x-coerce": { "price": "number" }
    }"#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Level {
        price: f64,
        size: f64,
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl DecodeObserver for Recorder {
        fn decode_started(&self, schema: &str, input: &Value) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {schema} {}", preview(input)));
        }

        fn decode_finished(&self, schema: &str, error_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish {schema} {error_count}"));
        }
    }

    fn levels() -> SchemaDescriptor {
        SchemaDescriptor::new("levels", LEVELS).unwrap()
    }

    #[test]
    fn conforming_value_decodes_unchanged() {
        let value = json!([{ "price": 1.5, "size": 2 }, { "price": 3, "size": 0.5 }]);
        assert_eq!(decode(&value, &levels()).unwrap(), value);
    }

    #[test]
    fn declared_coercions_apply_before_validation() {
        let value = json!([{ "price": "101.25", "size": 1 }]);
        let decoded: Vec<Level> = decode_as(&value, &levels()).unwrap();
        assert_eq!(
            decoded,
            vec![Level {
                price: 101.25,
                size: 1.0
            }]
        );
    }

    #[test]
    fn reports_one_issue_per_violation_with_paths() {
        let value = json!([
            { "price": 1, "size": "big" },
            { "price": 2 },
            { "price": "oops", "size": 1 }
        ]);
        let errors = decode(&value, &levels()).unwrap_err();

        assert_eq!(errors.len(), 3);
        let paths: Vec<&str> = errors.issues().iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"$[0].size"));
        assert!(paths.contains(&"$[1]"));
        assert!(paths.contains(&"$[2].price"));
    }

    #[test]
    fn summary_truncates_long_error_lists() {
        let value = Value::Array((0..8).map(|_| json!({ "price": 1 })).collect());
        let errors = decode(&value, &levels()).unwrap_err();

        assert_eq!(errors.len(), 8);
        let summary = errors.summary();
        assert!(summary.starts_with("8 errors. First 5:"));
        assert_eq!(summary.lines().count(), 6);

        let err = errors.into_validation_error("levels");
        assert_eq!(err.error_count, 8);
        assert_eq!(err.schema, "levels");
        assert_eq!(err.message, summary);
    }

    #[test]
    fn typed_decode_failure_is_rooted() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            missing: String,
        }

        let value = json!([]);
        let errors = decode_as::<Strict>(&value, &levels()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].path, "$");
    }

    #[test]
    fn observer_sees_truncated_preview_and_error_count() {
        let recorder = Recorder::default();
        let value = json!([
            { "price": 1, "size": 1 },
            { "price": 2, "size": 2 },
            { "price": 3, "size": 3 },
            { "price": 4 }
        ]);
        let _ = decode_with_observer(&value, &levels(), &recorder);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("start levels"));
        assert!(!events[0].contains("\"price\":4"));
        assert_eq!(events[1], "finish levels 1");
    }

    #[test]
    fn observer_receives_untruncated_input() {
        struct Capture(Mutex<Option<Value>>);

        impl DecodeObserver for Capture {
            fn decode_started(&self, _schema: &str, input: &Value) {
                *self.0.lock().unwrap() = Some(input.clone());
            }

            fn decode_finished(&self, _schema: &str, _error_count: usize) {}
        }

        let capture = Capture(Mutex::new(None));
        let value = Value::Array((0..5).map(|i| json!({ "price": i, "size": 1 })).collect());
        decode_with_observer(&value, &levels(), &capture).unwrap();

        assert_eq!(capture.0.lock().unwrap().as_ref(), Some(&value));
    }

    #[test]
    fn preview_keeps_short_inputs_whole() {
        let short = json!([1, 2, 3]);
        assert!(matches!(preview(&short), Cow::Borrowed(_)));
        assert_eq!(preview(&json!([1, 2, 3, 4, 5])).into_owned(), json!([1, 2, 3]));
        assert_eq!(preview(&json!({ "a": 1 })).into_owned(), json!({ "a": 1 }));
    }

    #[test]
    fn pointer_to_accessor() {
        assert_eq!(accessor_path(""), "$");
        assert_eq!(accessor_path("/0/price"), "$[0].price");
        assert_eq!(accessor_path("/data/12"), "$.data[12]");
        assert_eq!(accessor_path("/a~1b/x y"), "$[\"a/b\"][\"x y\"]");
    }
}
