//! Inputs of one resolution call

use stencil_domain::ReplaceValues;

use crate::ports::DocumentSource;

/// Borrowed snapshot of everything a resolver reads.
///
/// The documents and URL segments are treated as immutable for the duration
/// of the call; a fresh context is built for the next render pass.
#[derive(Clone, Copy)]
pub struct ResolutionContext<'a> {
    documents: &'a dyn DocumentSource,
    replace_values: Option<&'a ReplaceValues>,
    custom_fallback: Option<&'a str>,
}

impl<'a> ResolutionContext<'a> {
    /// Creates a context reading from `documents`, with no URL segments and
    /// no custom fallback.
    #[must_use]
    pub fn new(documents: &'a dyn DocumentSource) -> Self {
        Self {
            documents,
            replace_values: None,
            custom_fallback: None,
        }
    }

    /// Adds URL segments for `{n}` placeholders embedded in query expressions.
    #[must_use]
    pub fn with_replace_values(mut self, replace_values: &'a ReplaceValues) -> Self {
        self.replace_values = Some(replace_values);
        self
    }

    /// Sets or clears the caller's fallback text.
    #[must_use]
    pub fn with_optional_fallback(mut self, fallback: Option<&'a str>) -> Self {
        self.custom_fallback = fallback;
        self
    }

    /// Drops the URL segments, keeping documents and fallback.
    #[must_use]
    pub fn without_replace_values(mut self) -> Self {
        self.replace_values = None;
        self
    }

    /// Returns the document source.
    #[must_use]
    pub fn documents(&self) -> &'a dyn DocumentSource {
        self.documents
    }

    /// Returns the URL segments, if any.
    #[must_use]
    pub fn replace_values(&self) -> Option<&'a ReplaceValues> {
        self.replace_values
    }

    /// Returns the custom fallback, if any.
    #[must_use]
    pub fn custom_fallback(&self) -> Option<&'a str> {
        self.custom_fallback
    }
}

impl std::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("replace_values", &self.replace_values)
            .field("custom_fallback", &self.custom_fallback)
            .finish_non_exhaustive()
    }
}
