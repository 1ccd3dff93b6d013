//! Fail-fast decoding for request/response payloads.
//!
//! Unlike the envelope validators there is no policy here: an invalid value
//! is always an error.

use serde::de::DeserializeOwned;
use serde_json::Value;
use streamguard_schema::{decode, decode_as, DataValidationError, SchemaDescriptor};

/// Decode `value` into `T` or fail with the summarized violations.
pub fn data<T: DeserializeOwned>(
    value: &Value,
    schema: &SchemaDescriptor,
) -> Result<T, DataValidationError> {
    decode_as(value, schema).map_err(|errors| errors.into_validation_error(schema.name()))
}

/// Decode `value`, keeping the coerced JSON.
pub fn data_value(value: &Value, schema: &SchemaDescriptor) -> Result<Value, DataValidationError> {
    decode(value, schema).map_err(|errors| errors.into_validation_error(schema.name()))
}
