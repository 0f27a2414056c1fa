//! URL path segments addressed by position
//!
//! The routing layer hands the engine the segments of the current URL keyed by
//! their zero-based position as a string (`"0"`, `"1"`, ...). Positional
//! placeholders such as `{2}` read from this map.

use std::collections::BTreeMap;

/// Positional replacement values, keyed by the string form of the position.
///
/// A key may be present with no value, which models a segment past the end
/// of the URL; such entries never substitute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceValues {
    values: BTreeMap<String, Option<String>>,
}

impl ReplaceValues {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys the given segments by their position, starting at `"0"`.
    #[must_use]
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            values: segments
                .into_iter()
                .enumerate()
                .map(|(position, segment)| (position.to_string(), Some(segment.into())))
                .collect(),
        }
    }

    /// Splits a URL path on `/` and keys every segment by its position.
    ///
    /// The leading empty segment of an absolute path is kept, so in
    /// `/clusters/dev/pods` the segment `dev` sits at position `2`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Self::from_segments(path.split('/'))
    }

    /// Sets the value at a position key.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Returns the substitution for `key`, if the key holds a value.
    ///
    /// An explicit empty string is a value and is returned as such.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Option::as_deref)
    }

    /// Returns the number of keys, including those without a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ReplaceValues {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
