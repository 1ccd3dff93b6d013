use std::fmt;

use jsonschema::Validator;
use serde_json::Value;

use crate::coerce::{parse_coercions, Coercion};
use crate::error::{Result, SchemaError};

/// An immutable, named payload contract.
///
/// Holds the source schema document, its compiled validator and the
/// coercions declared with `x-coerce`. Two descriptors are equal when both
/// the name and the source document match.
pub struct SchemaDescriptor {
    name: String,
    schema: Value,
    validator: Validator,
    coercions: Vec<Coercion>,
}

impl SchemaDescriptor {
    /// Compile a descriptor from a JSON string.
    pub fn new(name: impl Into<String>, schema_json: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_json)?;
        Self::from_value(name, schema)
    }

    /// Compile a descriptor from a parsed schema document.
    pub fn from_value(name: impl Into<String>, schema: Value) -> Result<Self> {
        let name = name.into();
        let coercions = parse_coercions(&name, &schema)?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|err| SchemaError::CompileFailed {
                name: name.clone(),
                message: err.to_string(),
            })?;

        Ok(Self {
            name,
            schema,
            validator,
            coercions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `title` keyword of the schema document, if any.
    pub fn title(&self) -> Option<&str> {
        self.schema.get("title").and_then(Value::as_str)
    }

    /// The schema document as compiled.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn coercions(&self) -> &[Coercion] {
        &self.coercions
    }

    /// True when the top-level schema describes an array payload.
    pub fn expects_array(&self) -> bool {
        matches!(self.schema.get("type"), Some(Value::String(kind)) if kind == "array")
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl PartialEq for SchemaDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema
    }
}

impl Eq for SchemaDescriptor {}

impl fmt::Debug for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("name", &self.name)
            .field("title", &self.title())
            .field("coercions", &self.coercions)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_schema_and_reads_metadata() {
        let descriptor = SchemaDescriptor::new(
            "ticks",
            r#"{"title":"Ticks","type":"array","items":{"type":"number"},"x-coerce":{"p":"number"}}"#,
        )
        .unwrap();

        assert_eq!(descriptor.name(), "ticks");
        assert_eq!(descriptor.title(), Some("Ticks"));
        assert_eq!(descriptor.coercions().len(), 1);
        assert!(descriptor.expects_array());
        assert_eq!(descriptor.to_string(), "ticks");
    }

    #[test]
    fn invalid_schema_fails_compile() {
        let result = SchemaDescriptor::new("bad", r#"{"type":"definitely-not-a-type"}"#);
        assert!(matches!(result, Err(SchemaError::CompileFailed { .. })));
    }

    #[test]
    fn invalid_json_is_reported() {
        let result = SchemaDescriptor::new("bad", "{not json");
        assert!(matches!(result, Err(SchemaError::InvalidJson(_))));
    }

    #[test]
    fn equality_uses_name_and_document() {
        let a = SchemaDescriptor::new("a", r#"{"type":"object"}"#).unwrap();
        let same = SchemaDescriptor::new("a", r#"{"type":"object"}"#).unwrap();
        let renamed = SchemaDescriptor::new("b", r#"{"type":"object"}"#).unwrap();
        let reshaped = SchemaDescriptor::new("a", r#"{"type":"array"}"#).unwrap();

        assert_eq!(a, same);
        assert_ne!(a, renamed);
        assert_ne!(a, reshaped);
    }
}
