//! One-call entry points
//!
//! Thin wrappers over a default-configured [`PlaceholderResolver`] that
//! return only the resolved text. Use the resolver directly to change the
//! pass cap or default fallback, or to inspect diagnostics.

use std::sync::LazyLock;

use stencil_domain::ReplaceValues;

use crate::placeholder_resolver::{PlaceholderResolver, ResolutionContext};
use crate::ports::DocumentSource;

static DEFAULT_RESOLVER: LazyLock<PlaceholderResolver> = LazyLock::new(PlaceholderResolver::default);

/// Substitutes `{reqs[i][...keys]}` placeholders.
#[must_use]
pub fn resolve_data_path(
    text: &str,
    documents: &dyn DocumentSource,
    custom_fallback: Option<&str>,
) -> String {
    let context = ResolutionContext::new(documents).with_optional_fallback(custom_fallback);
    DEFAULT_RESOLVER.resolve_data_path(text, context).into_string()
}

/// Substitutes `{reqsJsonPath[i]['expr']}` placeholders, nested ones first.
///
/// `replace_values`, when given, fills `{n}` placeholders inside expressions.
#[must_use]
pub fn resolve_query_path(
    text: &str,
    documents: &dyn DocumentSource,
    custom_fallback: Option<&str>,
    replace_values: Option<&ReplaceValues>,
) -> String {
    let mut context = ResolutionContext::new(documents).with_optional_fallback(custom_fallback);
    if let Some(replace_values) = replace_values {
        context = context.with_replace_values(replace_values);
    }
    DEFAULT_RESOLVER.resolve_query_path(text, context).into_string()
}

/// Substitutes `{n}` placeholders with URL segments.
#[must_use]
pub fn substitute_positional(template: &str, replace_values: &ReplaceValues) -> String {
    DEFAULT_RESOLVER
        .substitute_positional(template, replace_values)
        .into_string()
}

/// Data-path then query-language substitution; `{n}` stays as written.
#[must_use]
pub fn resolve_data_only(
    text: &str,
    documents: &dyn DocumentSource,
    custom_fallback: Option<&str>,
) -> String {
    let context = ResolutionContext::new(documents).with_optional_fallback(custom_fallback);
    DEFAULT_RESOLVER.resolve_data_only(text, context).into_string()
}

/// Data path, query language, then positional substitution.
#[must_use]
pub fn resolve_all(text: &str, replace_values: &ReplaceValues, documents: &dyn DocumentSource) -> String {
    DEFAULT_RESOLVER
        .resolve_all(text, replace_values, documents)
        .into_string()
}

/// Full resolution for text in a brace-using query language, such as
/// `sum(up{job="{reqsJsonPath[0]['.job']}"})`.
#[must_use]
pub fn resolve_foreign_query(
    text: &str,
    replace_values: &ReplaceValues,
    documents: &dyn DocumentSource,
) -> String {
    DEFAULT_RESOLVER
        .resolve_foreign_query(text, replace_values, documents)
        .into_string()
}
