//! Domain error types

use thiserror::Error;

use crate::query::QueryError;

/// Domain-level errors raised while interpreting a single placeholder.
///
/// None of these ever reach the caller of a resolution pipeline: the
/// application layer contains them and leaves the placeholder untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The document index of a placeholder is not a valid `usize`.
    #[error("invalid document index: {0}")]
    InvalidDocumentIndex(String),

    /// The placeholder matched the grammar but its inner parts are unusable.
    #[error("malformed placeholder: {0}")]
    MalformedPlaceholder(String),

    /// The path-query expression failed to parse or evaluate.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
