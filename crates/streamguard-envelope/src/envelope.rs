use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use streamguard_schema::{decode_as_with_observer, DecodeObserver, SchemaDescriptor, TracingObserver};

use crate::error::Rejection;
use crate::policy::ErrorPolicy;

/// Wire name of the correlation identifier.
pub const CORRELATION_FIELD: &str = "uuid";

/// Validated `snapshot` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope<T> {
    pub correlation_id: String,
    pub snapshot: Vec<T>,
}

/// Validated `data` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub correlation_id: String,
    pub data: Vec<T>,
}

/// Envelope field holding the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Snapshot,
    Data,
}

impl PayloadField {
    pub fn name(self) -> &'static str {
        match self {
            PayloadField::Snapshot => "snapshot",
            PayloadField::Data => "data",
        }
    }
}

/// Validate a `{"uuid": .., "snapshot": [..]}` frame.
///
/// Returns `Ok(Some(envelope))` on success and whatever `policy` returns on
/// rejection. A frame that is not JSON fails with the policy's error type
/// without consulting the policy.
pub fn snapshot<T, P>(
    frame: impl AsRef<[u8]>,
    schema: &SchemaDescriptor,
    policy: P,
) -> Result<Option<SnapshotEnvelope<T>>, P::Error>
where
    T: DeserializeOwned,
    P: ErrorPolicy<SnapshotEnvelope<T>>,
{
    snapshot_with_observer(frame, schema, &TracingObserver, policy)
}

/// [`snapshot`] with an explicit decode observer.
pub fn snapshot_with_observer<T, P>(
    frame: impl AsRef<[u8]>,
    schema: &SchemaDescriptor,
    observer: &dyn DecodeObserver,
    policy: P,
) -> Result<Option<SnapshotEnvelope<T>>, P::Error>
where
    T: DeserializeOwned,
    P: ErrorPolicy<SnapshotEnvelope<T>>,
{
    validate(
        frame.as_ref(),
        PayloadField::Snapshot,
        schema,
        observer,
        policy,
        |correlation_id, snapshot| SnapshotEnvelope {
            correlation_id,
            snapshot,
        },
    )
}

/// Validate a `{"uuid": .., "data": [..]}` frame. An empty `data` array is valid.
///
/// Policy semantics match [`snapshot`].
pub fn data<T, P>(
    frame: impl AsRef<[u8]>,
    schema: &SchemaDescriptor,
    policy: P,
) -> Result<Option<DataEnvelope<T>>, P::Error>
where
    T: DeserializeOwned,
    P: ErrorPolicy<DataEnvelope<T>>,
{
    data_with_observer(frame, schema, &TracingObserver, policy)
}

/// [`data`] with an explicit decode observer.
pub fn data_with_observer<T, P>(
    frame: impl AsRef<[u8]>,
    schema: &SchemaDescriptor,
    observer: &dyn DecodeObserver,
    policy: P,
) -> Result<Option<DataEnvelope<T>>, P::Error>
where
    T: DeserializeOwned,
    P: ErrorPolicy<DataEnvelope<T>>,
{
    validate(
        frame.as_ref(),
        PayloadField::Data,
        schema,
        observer,
        policy,
        |correlation_id, data| DataEnvelope {
            correlation_id,
            data,
        },
    )
}

fn validate<T, V, P>(
    frame: &[u8],
    field: PayloadField,
    schema: &SchemaDescriptor,
    observer: &dyn DecodeObserver,
    policy: P,
    build: impl FnOnce(String, Vec<T>) -> V,
) -> Result<Option<V>, P::Error>
where
    T: DeserializeOwned,
    P: ErrorPolicy<V>,
{
    let envelope: Value = serde_json::from_slice(frame)?;

    let (correlation_id, payload) = match check_envelope(&envelope, field) {
        Ok(parts) => parts,
        Err(rejection) => {
            tracing::warn!(
                field = field.name(),
                schema = schema.name(),
                %rejection,
                "rejected malformed envelope"
            );
            return policy.handle(rejection);
        }
    };

    match decode_as_with_observer::<Vec<T>>(payload, schema, observer) {
        Ok(items) => Ok(Some(build(correlation_id.to_string(), items))),
        Err(errors) => {
            tracing::debug!(
                correlation_id,
                schema = schema.name(),
                error_count = errors.len(),
                "payload failed schema validation"
            );
            policy.handle(Rejection::Schema(errors.into_validation_error(schema.name())))
        }
    }
}

fn check_envelope(envelope: &Value, field: PayloadField) -> Result<(&str, &Value), Rejection> {
    let correlation_id = envelope
        .get(CORRELATION_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or(Rejection::MissingCorrelationId)?;

    let payload = match envelope.get(field.name()) {
        None | Some(Value::Null) => {
            return Err(Rejection::MissingPayload {
                field: field.name(),
            })
        }
        Some(payload @ Value::Array(_)) => payload,
        Some(other) => {
            return Err(Rejection::PayloadNotArray {
                field: field.name(),
                found: json_type_name(other),
            })
        }
    };

    Ok((correlation_id, payload))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
