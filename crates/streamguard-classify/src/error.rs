use crate::kind::MessageKind;

/// Errors raised while turning a frame into a typed [`crate::Message`].
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// No predicate matched the value.
    #[error("unrecognized message shape")]
    Unrecognized,

    /// A predicate matched but the value does not deserialize as that kind.
    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClassifyError>;
