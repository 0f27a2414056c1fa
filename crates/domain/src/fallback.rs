//! Fallback chain for nullish placeholder values
//!
//! Three texts can stand in for a missing value: the inline fallback written
//! inside the placeholder, a custom fallback supplied by the caller, and the
//! configured default. The two data-source resolvers pick among them in
//! slightly different orders, both captured here.

use serde_json::Value;

use crate::display::to_display_string;
use crate::document::Lookup;

/// Default text when neither an inline nor a custom fallback is available.
pub const DEFAULT_FALLBACK: &str = "Undefined with no fallback";

/// The fallback texts available to one placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackChain<'a> {
    inline: Option<&'a str>,
    custom: Option<&'a str>,
    default: &'a str,
}

impl<'a> FallbackChain<'a> {
    /// Creates a chain. An empty custom fallback counts as not supplied.
    #[must_use]
    pub fn new(inline: Option<&'a str>, custom: Option<&'a str>, default: &'a str) -> Self {
        Self {
            inline,
            custom: custom.filter(|text| !text.is_empty()),
            default,
        }
    }

    /// Returns the inline fallback, if the placeholder carries one.
    #[must_use]
    pub const fn inline(&self) -> Option<&'a str> {
        self.inline
    }

    /// Returns the effective custom fallback.
    #[must_use]
    pub const fn custom(&self) -> Option<&'a str> {
        self.custom
    }

    /// Custom first, then inline, then the default.
    #[must_use]
    pub fn nullish_text(&self) -> &'a str {
        self.custom.or(self.inline).unwrap_or(self.default)
    }

    /// Picks the text for a data-path lookup.
    ///
    /// The inline fallback acts as the traversal default: it replaces a
    /// missing value outright, before the custom fallback is considered.
    /// An explicit `null` goes through the full chain.
    #[must_use]
    pub fn for_data_path(&self, lookup: Lookup<'_>) -> String {
        match (lookup, self.inline) {
            (Lookup::Found(value), _) => to_display_string(&value),
            (Lookup::Missing, Some(inline)) => inline.to_string(),
            _ => self.nullish_text().to_string(),
        }
    }

    /// Picks the text for the first result of a query.
    #[must_use]
    pub fn for_query(&self, first: Option<&Value>) -> String {
        match first {
            Some(value) if !value.is_null() => to_display_string(value),
            _ => self.nullish_text().to_string(),
        }
    }

    /// Picks the text when the queried document was never fetched.
    #[must_use]
    pub fn for_missing_document(&self) -> String {
        self.nullish_text().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::borrow::Cow;

    #[test]
    fn test_data_path_found() {
        let chain = FallbackChain::new(Some("inline"), Some("custom"), DEFAULT_FALLBACK);
        assert_eq!(chain.for_data_path(Lookup::Found(Cow::Owned(json!(3)))), "3");
    }

    #[test]
    fn test_data_path_missing_prefers_inline() {
        let chain = FallbackChain::new(Some("inline"), Some("custom"), DEFAULT_FALLBACK);
        assert_eq!(chain.for_data_path(Lookup::Missing), "inline");
    }

    #[test]
    fn test_data_path_null_prefers_custom() {
        let chain = FallbackChain::new(Some("inline"), Some("custom"), DEFAULT_FALLBACK);
        assert_eq!(chain.for_data_path(Lookup::Null), "custom");
    }

    #[test]
    fn test_data_path_missing_without_inline() {
        let chain = FallbackChain::new(None, Some("custom"), DEFAULT_FALLBACK);
        assert_eq!(chain.for_data_path(Lookup::Missing), "custom");

        let chain = FallbackChain::new(None, None, DEFAULT_FALLBACK);
        assert_eq!(chain.for_data_path(Lookup::Missing), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_query_nullish_prefers_custom() {
        let chain = FallbackChain::new(Some("inline"), Some("custom"), DEFAULT_FALLBACK);
        assert_eq!(chain.for_query(None), "custom");
        assert_eq!(chain.for_query(Some(&Value::Null)), "custom");
        assert_eq!(chain.for_missing_document(), "custom");
    }

    #[test]
    fn test_query_inline_then_default() {
        let chain = FallbackChain::new(Some("inline"), None, DEFAULT_FALLBACK);
        assert_eq!(chain.for_query(None), "inline");

        let chain = FallbackChain::new(None, None, DEFAULT_FALLBACK);
        assert_eq!(chain.for_missing_document(), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_empty_custom_is_ignored() {
        let chain = FallbackChain::new(Some("inline"), Some(""), DEFAULT_FALLBACK);
        assert_eq!(chain.custom(), None);
        assert_eq!(chain.for_query(None), "inline");
    }
}
