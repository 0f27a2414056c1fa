//! Application error types

use stencil_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
///
/// Resolution never returns these to its caller; they are turned into
/// diagnostics and the offending placeholder is left as written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain error occurred while interpreting a placeholder.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The document source failed to produce a document.
    #[error("document {index} unavailable: {reason}")]
    DocumentUnavailable {
        /// Index of the requested document.
        index: usize,
        /// Why the source could not serve it.
        reason: String,
    },

    /// A configuration fragment could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
