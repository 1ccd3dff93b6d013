//! Structural message predicates.
//!
//! The wire protocol carries no uniform type tag, so each message kind is
//! recognized by which fields it has and, for events, by sentinel values.
//! Every predicate is stateless and independent of the others.

use serde_json::Value;
use streamguard_schema::{SchemaDescriptor, SchemaRegistry, EXCHANGE_DATA, INFO_DATA};

/// `event` value of a payment confirmation.
pub const EVENT_PAYMENT_RECEIVED: &str = "payment received";
/// `event` value of a subscription end notice.
pub const EVENT_UNSUBSCRIBED: &str = "unsubscribed";

/// Connection welcome: has a string `ln_uri`.
pub fn is_init_msg(value: &Value) -> bool {
    has_string(value, "ln_uri")
}

/// Has a string `invoice`.
pub fn is_invoice(value: &Value) -> bool {
    has_string(value, "invoice")
}

/// Has an array `snapshot` and a string `uuid`.
pub fn is_snapshot(value: &Value) -> bool {
    has_array(value, "snapshot") && has_uuid(value)
}

/// Has a string `uuid`.
pub fn has_uuid(value: &Value) -> bool {
    has_string(value, "uuid")
}

/// Has an array `data` and a string `uuid`.
pub fn has_data_and_uuid(value: &Value) -> bool {
    has_array(value, "data") && has_uuid(value)
}

/// Truthy value decoded with a schema from the informational data family.
pub fn is_ppc_data_response(
    value: &Value,
    schema: &SchemaDescriptor,
    registry: &SchemaRegistry,
) -> bool {
    is_truthy(value) && registry.contains(INFO_DATA, schema)
}

/// Value with a `data` field decoded with a schema from the exchange data family.
pub fn is_exchange_data_response(
    value: &Value,
    schema: &SchemaDescriptor,
    registry: &SchemaRegistry,
) -> bool {
    value.get("data").is_some() && registry.contains(EXCHANGE_DATA, schema)
}

pub fn is_payment_received(value: &Value) -> bool {
    has_uuid(value)
        && has_string(value, "exchange")
        && has_number(value, "duration")
        && has_string(value, "symbol")
        && event_is(value, EVENT_PAYMENT_RECEIVED)
}

/// Has a string `uuid` and a numeric `warnings.duration`.
pub fn is_time_warning(value: &Value) -> bool {
    has_uuid(value)
        && value
            .get("warnings")
            .is_some_and(|warnings| has_number(warnings, "duration"))
}

pub fn is_unsubscribed(value: &Value) -> bool {
    has_uuid(value) && event_is(value, EVENT_UNSUBSCRIBED) && has_number(value, "amountRefunded")
}

fn has_string(value: &Value, field: &str) -> bool {
    value.get(field).is_some_and(Value::is_string)
}

fn has_number(value: &Value, field: &str) -> bool {
    value.get(field).is_some_and(Value::is_number)
}

fn has_array(value: &Value, field: &str) -> bool {
    value.get(field).is_some_and(Value::is_array)
}

fn event_is(value: &Value, sentinel: &str) -> bool {
    value.get("event").and_then(Value::as_str) == Some(sentinel)
}

/// JavaScript truthiness: `null`, `false`, `0`, `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn field_presence_predicates() {
        assert!(is_init_msg(&json!({ "ln_uri": "node@host:9735" })));
        assert!(!is_init_msg(&json!({ "ln_uri": 1 })));

        assert!(is_invoice(&json!({ "invoice": "lnbc..." })));
        assert!(!is_invoice(&json!({ "invoice": null })));

        assert!(is_snapshot(&json!({ "uuid": "a", "snapshot": [] })));
        assert!(!is_snapshot(&json!({ "uuid": "a", "snapshot": {} })));
        assert!(!is_snapshot(&json!({ "snapshot": [] })));

        assert!(has_data_and_uuid(&json!({ "uuid": "a", "data": [1] })));
        assert!(!has_data_and_uuid(&json!({ "uuid": "a", "data": "x" })));

        assert!(has_uuid(&json!({ "uuid": "" })));
        assert!(!has_uuid(&json!([1, 2])));
        assert!(!has_uuid(&json!("uuid")));
    }

    #[test]
    fn event_predicates_check_sentinels_and_types() {
        let paid = json!({
            "uuid": "x", "exchange": "binance", "symbol": "BTC",
            "duration": 60, "event": "payment received"
        });
        assert!(is_payment_received(&paid));

        let mut wrong_type = paid.clone();
        wrong_type["duration"] = json!("60");
        assert!(!is_payment_received(&wrong_type));

        let mut wrong_event = paid.clone();
        wrong_event["event"] = json!("Payment Received");
        assert!(!is_payment_received(&wrong_event));

        assert!(is_time_warning(&json!({ "uuid": "x", "warnings": { "duration": 30 } })));
        assert!(!is_time_warning(&json!({ "uuid": "x", "warnings": { "duration": "30" } })));
        assert!(!is_time_warning(&json!({ "uuid": "x", "duration": 30 })));

        let unsubscribed = json!({ "uuid": "x", "event": "unsubscribed", "amountRefunded": 5 });
        assert!(is_unsubscribed(&unsubscribed));
        assert!(has_uuid(&unsubscribed));
        assert!(!is_payment_received(&unsubscribed));
        assert!(!is_unsubscribed(&json!({ "uuid": "x", "event": "unsubscribed" })));
    }

    #[test]
    fn family_predicates_use_registry_membership() {
        let registry = SchemaRegistry::builtin().unwrap();
        let scores = registry.require("sports-score").unwrap();
        let book = registry.require("futures-book").unwrap();

        let response = json!({ "uuid": "a", "data": [] });
        assert!(is_ppc_data_response(&response, scores, &registry));
        assert!(!is_ppc_data_response(&response, book, &registry));
        assert!(is_exchange_data_response(&response, book, &registry));
        assert!(!is_exchange_data_response(&response, scores, &registry));

        assert!(!is_ppc_data_response(&Value::Null, scores, &registry));
        assert!(!is_ppc_data_response(&json!(0), scores, &registry));
        assert!(is_ppc_data_response(&json!([]), scores, &registry));
        assert!(!is_exchange_data_response(&json!({ "uuid": "a" }), book, &registry));
    }

    #[test]
    fn unregistered_descriptor_is_in_no_family() {
        let registry = SchemaRegistry::builtin().unwrap();
        let stray = SchemaDescriptor::new("spot-book", r#"{"type":"array"}"#).unwrap();
        let response = json!({ "data": [] });

        assert!(!is_exchange_data_response(&response, &stray, &registry));
        assert!(!is_ppc_data_response(&response, &stray, &registry));
    }
}
