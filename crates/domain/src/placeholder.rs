//! Placeholder references found in a template
//!
//! Three grammars are recognised:
//!
//! - data path: `{reqs[0]['spec','replicas']}` with an optional trailing
//!   `['fallback']`
//! - query language: `{reqsJsonPath[0]['.items[0].metadata.name']}` with an
//!   optional trailing `['fallback']`
//! - positional: `{3}`
//!
//! References borrow from the scanned text and carry the byte span of the
//! whole placeholder so the resolver can splice replacements in.

use std::ops::Range;

use crate::error::{DomainError, DomainResult};

/// Which grammar a placeholder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `{reqs[i][...keys]}`
    DataPath,
    /// `{reqsJsonPath[i]['expr']}`
    Query,
    /// `{n}`
    Positional,
}

impl std::fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DataPath => "data-path",
            Self::Query => "query",
            Self::Positional => "positional",
        };
        f.write_str(name)
    }
}

/// A `{reqs[...]...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPathRef<'a> {
    /// Byte range of the whole placeholder in the scanned text.
    pub span: Range<usize>,
    /// Digits of the document index, as written.
    pub index: &'a str,
    /// Keys to follow, in order. Never empty.
    pub keys: Vec<&'a str>,
    /// Inline fallback, if present.
    pub fallback: Option<&'a str>,
}

impl DataPathRef<'_> {
    /// Parses the document index.
    ///
    /// # Errors
    ///
    /// Fails when the digits overflow `usize`.
    pub fn document_index(&self) -> DomainResult<usize> {
        parse_index(self.index)
    }
}

/// A `{reqsJsonPath[...]...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRef<'a> {
    /// Byte range of the whole placeholder in the scanned text.
    pub span: Range<usize>,
    /// Digits of the document index, as written.
    pub index: &'a str,
    /// The raw expression between its quotes; may embed other placeholders.
    pub expression: &'a str,
    /// Inline fallback, if present.
    pub fallback: Option<&'a str>,
}

impl QueryRef<'_> {
    /// Parses the document index.
    ///
    /// # Errors
    ///
    /// Fails when the digits overflow `usize`.
    pub fn document_index(&self) -> DomainResult<usize> {
        parse_index(self.index)
    }
}

/// A `{n}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalRef<'a> {
    /// Byte range of the whole placeholder in the scanned text.
    pub span: Range<usize>,
    /// The digits between the braces, used verbatim as the lookup key.
    pub key: &'a str,
}

/// Parses the digits of a document index.
///
/// # Errors
///
/// Returns [`DomainError::InvalidDocumentIndex`] for empty input, non-digits
/// or values past `usize::MAX`.
pub fn parse_index(digits: &str) -> DomainResult<usize> {
    digits
        .parse::<usize>()
        .map_err(|_| DomainError::InvalidDocumentIndex(digits.to_string()))
}
