//! Fetched documents and deep key traversal
//!
//! A render pass fetches a handful of JSON documents and numbers them from 0.
//! Templates address them as `req0`, `req1`, ... through placeholders.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

/// Snapshot of the documents fetched for one render pass, keyed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documents {
    entries: BTreeMap<usize, Value>,
}

impl Documents {
    /// Creates an empty document map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from values in fetch order, indexing them from 0.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            entries: values.into_iter().enumerate().collect(),
        }
    }

    /// Stores a document at the given index, replacing any previous one.
    pub fn insert(&mut self, index: usize, document: Value) -> &mut Self {
        self.entries.insert(index, document);
        self
    }

    /// Returns the document at `index`, if one was fetched.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.entries.get(&index)
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no document was fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(usize, Value)> for Documents {
    fn from_iter<T: IntoIterator<Item = (usize, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<usize, Value>> for Documents {
    fn from(entries: BTreeMap<usize, Value>) -> Self {
        Self { entries }
    }
}

/// Outcome of looking a value up inside a document.
///
/// `Missing` and `Null` are both nullish, but the data-path fallback chain
/// treats them differently: only `Missing` picks up the inline default.
/// A found value is usually borrowed from the document; derived values such
/// as an array `length` are owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Nothing exists at the path.
    Missing,
    /// The path exists and holds an explicit `null`.
    Null,
    /// The path exists and holds a non-null value.
    Found(Cow<'a, Value>),
}

impl<'a> Lookup<'a> {
    fn found(value: Cow<'a, Value>) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Found(value)
        }
    }

    /// Returns true for `Missing` and `Null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        !matches!(self, Self::Found(_))
    }
}

/// Follows `keys` from `root` one step at a time.
///
/// - objects are indexed by key
/// - arrays by canonical decimal position (`"0"`, `"12"`, never `"+1"` or
///   `"01"`), and expose `length`
/// - strings by UTF-16 code unit, and expose `length` in code units
///
/// A missing root, any other scalar or a nullish intermediate ends the walk
/// with [`Lookup::Missing`].
#[must_use]
pub fn deep_get<'a, K: AsRef<str>>(root: Option<&'a Value>, keys: &[K]) -> Lookup<'a> {
    let Some(root) = root else {
        return Lookup::Missing;
    };

    let mut current = Cow::Borrowed(root);
    for key in keys {
        let key = key.as_ref();
        let next = match &current {
            Cow::Borrowed(value) => step(*value, key),
            Cow::Owned(value) => step(value, key).map(|found| Cow::Owned(found.into_owned())),
        };
        match next {
            Some(value) => current = value,
            None => return Lookup::Missing,
        }
    }

    Lookup::found(current)
}

fn step<'v>(value: &'v Value, key: &str) -> Option<Cow<'v, Value>> {
    match value {
        Value::Object(map) => map.get(key).map(Cow::Borrowed),
        Value::Array(items) if key == "length" => Some(Cow::Owned(Value::from(items.len()))),
        Value::Array(items) => array_index(key)
            .and_then(|index| items.get(index))
            .map(Cow::Borrowed),
        Value::String(text) if key == "length" => {
            Some(Cow::Owned(Value::from(text.encode_utf16().count())))
        }
        Value::String(text) => array_index(key)
            .and_then(|index| code_unit_at(text, index))
            .map(Cow::Owned),
        _ => None,
    }
}

/// Parses a key that names an array position.
fn array_index(key: &str) -> Option<usize> {
    let canonical = key == "0"
        || (!key.starts_with('0') && !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()));
    if canonical { key.parse().ok() } else { None }
}

/// A lone surrogate cannot live in a Rust string and becomes U+FFFD.
fn code_unit_at(text: &str, index: usize) -> Option<Value> {
    let unit = text.encode_utf16().nth(index)?;
    let ch = char::decode_utf16([unit])
        .next()
        .and_then(Result::ok)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Some(Value::String(ch.to_string()))
}
