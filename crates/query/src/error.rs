use crate::eval::EvalError;

/// Errors surfaced by content queries.
///
/// Cloneable so a failed query can be stored alongside the state it produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),

    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed document in {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("query evaluation failed: {0}")]
    Eval(#[from] EvalError),
}
