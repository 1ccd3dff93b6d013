/// Errors raised while building or querying a schema registry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema file or directory could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema document could not be compiled.
    #[error("failed to compile schema '{name}': {message}")]
    CompileFailed { name: String, message: String },

    /// The schema declares an unusable `x-coerce` table.
    #[error("invalid coercion in schema '{name}': {message}")]
    InvalidCoercion { name: String, message: String },

    /// The schema document is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A family or schema name contains characters outside `[a-z0-9._-]`.
    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    /// A schema with this name is already registered.
    #[error("schema '{name}' already registered in family '{family}'")]
    DuplicateSchema { name: String, family: String },

    /// No schema registered under the given name.
    #[error("no schema registered under '{0}'")]
    UnknownSchema(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// A payload failed schema decoding.
///
/// `message` is the bounded summary produced by [`crate::report::summarize`];
/// `error_count` is the total number of violations, including those left out
/// of the summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("data validation failed for schema '{schema}': {message}")]
pub struct DataValidationError {
    pub schema: String,
    pub error_count: usize,
    pub message: String,
}
