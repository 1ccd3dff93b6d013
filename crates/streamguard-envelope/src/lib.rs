//! Envelope validation for streaming API frames.
//!
//! Market and sports payloads arrive wrapped in an envelope carrying a
//! correlation identifier (`uuid`) and a payload array (`snapshot` or
//! `data`). [`snapshot`] and [`data`] check the envelope shape first, so a
//! malformed envelope yields a field-specific diagnostic, then decode the
//! payload against the caller's schema.
//!
//! Rejections go through a caller-supplied [`ErrorPolicy`]; only a frame
//! that is not JSON at all bypasses it.

pub mod envelope;
pub mod error;
pub mod policy;
pub mod rest;

pub use envelope::{
    data, data_with_observer, snapshot, snapshot_with_observer, DataEnvelope, PayloadField,
    SnapshotEnvelope, CORRELATION_FIELD,
};
pub use error::{EnvelopeError, Rejection, Result};
pub use policy::{ErrorPolicy, Lenient, Strict, Substitute};
