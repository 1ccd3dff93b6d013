//! Per-schema value coercions.
//!
//! Upstream feeds disagree on how numbers travel: some exchanges quote
//! prices as strings to keep precision, some sports feeds send numeric game
//! identifiers. A schema declares the canonical type of such fields with the
//! `x-coerce` extension keyword:
//!
//! ```json
//! { "type": "array", "items": { ... }, "x-coerce": { "price": "number" } }
//! ```
//!
//! Coercions run before validation, on the top-level object or on every
//! element object of a top-level array. A value that cannot be converted is
//! left alone so that validation reports it against the declared type. That
//! includes integer strings outside the 64-bit range.

use serde_json::{Map, Number, Value};

use crate::error::{Result, SchemaError};

/// Extension keyword carrying the coercion table.
pub const COERCE_KEYWORD: &str = "x-coerce";

/// Target type of a coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceTo {
    /// Decimal string to JSON number.
    Number,
    /// JSON number to decimal string.
    String,
}

/// A single field coercion declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    pub field: String,
    pub target: CoerceTo,
}

pub(crate) fn parse_coercions(name: &str, schema: &Value) -> Result<Vec<Coercion>> {
    let table = match schema.get(COERCE_KEYWORD) {
        None => return Ok(Vec::new()),
        Some(Value::Object(table)) => table,
        Some(_) => {
            return Err(SchemaError::InvalidCoercion {
                name: name.to_string(),
                message: format!("{COERCE_KEYWORD} must be an object"),
            })
        }
    };

    table
        .iter()
        .map(|(field, target)| {
            let target = match target.as_str() {
                Some("number") => CoerceTo::Number,
                Some("string") => CoerceTo::String,
                _ => {
                    return Err(SchemaError::InvalidCoercion {
                        name: name.to_string(),
                        message: format!(
                            "field '{field}' has target {target}, expected \"number\" or \"string\""
                        ),
                    })
                }
            };
            Ok(Coercion {
                field: field.clone(),
                target,
            })
        })
        .collect()
}

pub(crate) fn apply_coercions(value: &mut Value, coercions: &[Coercion]) {
    if coercions.is_empty() {
        return;
    }

    match value {
        Value::Object(map) => coerce_object(map, coercions),
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    coerce_object(map, coercions);
                }
            }
        }
        _ => {}
    }
}

fn coerce_object(map: &mut Map<String, Value>, coercions: &[Coercion]) {
    for coercion in coercions {
        if let Some(field) = map.get_mut(&coercion.field) {
            coerce_value(field, coercion.target);
        }
    }
}

fn coerce_value(value: &mut Value, target: CoerceTo) {
    let replacement = match (target, &*value) {
        (CoerceTo::Number, Value::String(text)) => number_from_str(text).map(Value::Number),
        (CoerceTo::String, Value::Number(number)) => Some(Value::String(number.to_string())),
        _ => None,
    };

    if let Some(replacement) = replacement {
        *value = replacement;
    }
}

fn number_from_str(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(uint) = text.parse::<u64>() {
        return Some(Number::from(uint));
    }
    if is_integer_literal(text) {
        // Out of 64-bit range; f64 would drop digits.
        tracing::debug!(value = text, "integer string out of range, not coerced");
        return None;
    }
    // f64::from_str accepts "inf" and "NaN"; Number::from_f64 rejects both.
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn price_size() -> Vec<Coercion> {
        vec![
            Coercion {
                field: "price".to_string(),
                target: CoerceTo::Number,
            },
            Coercion {
                field: "id".to_string(),
                target: CoerceTo::String,
            },
        ]
    }

    #[test]
    fn parses_coercion_table() {
        let schema = json!({ "type": "object", "x-coerce": { "price": "number" } });
        let parsed = parse_coercions("book", &schema).unwrap();
        assert_eq!(
            parsed,
            vec![Coercion {
                field: "price".to_string(),
                target: CoerceTo::Number
            }]
        );
    }

    #[test]
    fn schema_without_table_has_no_coercions() {
        let parsed = parse_coercions("plain", &json!({ "type": "object" })).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn rejects_unknown_target() {
        let schema = json!({ "x-coerce": { "price": "decimal" } });
        assert!(matches!(
            parse_coercions("book", &schema),
            Err(SchemaError::InvalidCoercion { .. })
        ));

        let schema = json!({ "x-coerce": ["price"] });
        assert!(matches!(
            parse_coercions("book", &schema),
            Err(SchemaError::InvalidCoercion { .. })
        ));
    }

    #[test]
    fn coerces_every_array_element() {
        let mut value = json!([
            { "price": "101.5", "id": 7 },
            { "price": "42", "id": "already" },
            "not-an-object"
        ]);
        apply_coercions(&mut value, &price_size());

        assert_eq!(
            value,
            json!([
                { "price": 101.5, "id": "7" },
                { "price": 42, "id": "already" },
                "not-an-object"
            ])
        );
    }

    #[test]
    fn leaves_unparseable_values_untouched() {
        let mut value = json!({ "price": "twelve", "other": "1" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": "twelve", "other": "1" }));

        let mut value = json!({ "price": "inf" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": "inf" }));
    }

    #[test]
    fn out_of_range_integers_stay_strings() {
        let mut value = json!({ "price": "123456789012345678901" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": "123456789012345678901" }));

        let mut value = json!({ "price": "-99999999999999999999" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": "-99999999999999999999" }));

        let mut value = json!({ "price": "18446744073709551615" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": 18446744073709551615u64 }));

        let mut value = json!({ "price": "1.5e3" });
        apply_coercions(&mut value, &price_size());
        assert_eq!(value, json!({ "price": 1500.0 }));
    }
}
