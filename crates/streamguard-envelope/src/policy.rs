//! Error policies.
//!
//! A policy decides what a rejected frame turns into: a failure, a
//! substitute value, or nothing at all. Validators return exactly what the
//! policy returns, and an error produced by the policy reaches the caller
//! unchanged.
//!
//! Any `FnOnce(Rejection) -> Result<Option<V>, E>` is a policy, as long as
//! `E` can also carry a JSON parse failure.

use crate::error::{EnvelopeError, Rejection};

/// Failure handler consulted when a frame is rejected.
pub trait ErrorPolicy<V> {
    /// Error type of the validation call; must absorb JSON parse failures.
    type Error: From<serde_json::Error>;

    fn handle(self, rejection: Rejection) -> Result<Option<V>, Self::Error>;
}

impl<V, E, F> ErrorPolicy<V> for F
where
    F: FnOnce(Rejection) -> Result<Option<V>, E>,
    E: From<serde_json::Error>,
{
    type Error = E;

    fn handle(self, rejection: Rejection) -> Result<Option<V>, E> {
        self(rejection)
    }
}

/// Fail the call with [`EnvelopeError::Rejected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl<V> ErrorPolicy<V> for Strict {
    type Error = EnvelopeError;

    fn handle(self, rejection: Rejection) -> Result<Option<V>, EnvelopeError> {
        Err(EnvelopeError::Rejected(rejection))
    }
}

/// Swallow the rejection and return `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lenient;

impl<V> ErrorPolicy<V> for Lenient {
    type Error = EnvelopeError;

    fn handle(self, _rejection: Rejection) -> Result<Option<V>, EnvelopeError> {
        Ok(None)
    }
}

/// Replace a rejected frame with a fixed value.
#[derive(Debug, Clone, Default)]
pub struct Substitute<V>(pub V);

impl<V> ErrorPolicy<V> for Substitute<V> {
    type Error = EnvelopeError;

    fn handle(self, _rejection: Rejection) -> Result<Option<V>, EnvelopeError> {
        Ok(Some(self.0))
    }
}
