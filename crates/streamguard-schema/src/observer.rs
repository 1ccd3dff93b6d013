//! Decode tracing hooks.
//!
//! Observers see every decode call but cannot change its outcome.

use serde_json::Value;

use crate::decoder::preview;

/// Receives trace events from the decoder.
pub trait DecodeObserver: Send + Sync {
    /// Called before validation with the untouched input.
    ///
    /// Implementations that record the input should truncate it with
    /// [`preview`] first.
    fn decode_started(&self, schema: &str, input: &Value);

    /// Called after validation with the number of violations found.
    fn decode_finished(&self, schema: &str, error_count: usize);
}

/// Emits decode events through `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn decode_started(&self, schema: &str, input: &Value) {
        tracing::debug!(schema, preview = %preview(input), "decoding payload");
    }

    fn decode_finished(&self, schema: &str, error_count: usize) {
        if error_count == 0 {
            tracing::debug!(schema, "payload decoded");
        } else {
            tracing::debug!(schema, error_count, "payload failed decoding");
        }
    }
}

/// Discards all decode events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {
    fn decode_started(&self, _schema: &str, _input: &Value) {}

    fn decode_finished(&self, _schema: &str, _error_count: usize) {}
}
