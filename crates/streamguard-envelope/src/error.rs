use streamguard_schema::DataValidationError;

/// Why a well-formed JSON frame was not accepted.
///
/// Every rejection is handed to the caller's error policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The envelope carries no usable `uuid`.
    #[error("envelope has no UUID")]
    MissingCorrelationId,

    /// The payload field is absent or null.
    #[error("envelope has no '{field}' field")]
    MissingPayload { field: &'static str },

    /// The payload field is present but not an array.
    #[error("envelope field '{field}' must be an array, found {found}")]
    PayloadNotArray {
        field: &'static str,
        found: &'static str,
    },

    /// The payload failed schema decoding.
    #[error(transparent)]
    Schema(#[from] DataValidationError),
}

impl Rejection {
    /// True for rejections raised before schema decoding.
    pub fn is_envelope_shape(&self) -> bool {
        !matches!(self, Rejection::Schema(_))
    }
}

/// Errors surfaced by the stock error policies.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The frame is not valid JSON. Never routed through an error policy.
    #[error("frame is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The frame was rejected and the policy chose to fail.
    #[error("frame rejected: {0}")]
    Rejected(#[from] Rejection),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
